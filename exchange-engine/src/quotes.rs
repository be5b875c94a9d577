//! Quote store: the authoritative current price of every listed stock.

use crate::store::Store;
use crate::sync;
use log::{debug, warn};
use market::{ExchangeError, Result, Stock, Symbol, ValidationError};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

pub struct QuoteStore {
    stocks: RwLock<HashMap<Symbol, Arc<Mutex<Stock>>>>,
    store: Arc<dyn Store>,
}

impl QuoteStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            stocks: Default::default(),
            store,
        }
    }

    /// Registers a stock already held by the store. Does not persist.
    pub(crate) fn seed(&self, stock: Stock) -> std::result::Result<(), ValidationError> {
        let mut stocks = sync::write(&self.stocks);
        if stocks.contains_key(stock.symbol()) {
            return Err(ValidationError::DuplicateSymbol(stock.symbol().clone()));
        }
        stocks.insert(stock.symbol().clone(), Arc::new(Mutex::new(stock)));
        Ok(())
    }

    /// Lists a new stock, persisting it first.
    pub fn list_stock(&self, stock: Stock) -> Result<()> {
        stock.validate()?;
        let mut stocks = sync::write(&self.stocks);
        if stocks.contains_key(stock.symbol()) {
            return Err(ValidationError::DuplicateSymbol(stock.symbol().clone()).into());
        }
        self.store.persist_stock(&stock)?;
        debug!("Listed {} ({}) at {:.2}", stock.symbol(), stock.sector(), stock.price());
        stocks.insert(stock.symbol().clone(), Arc::new(Mutex::new(stock)));
        Ok(())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        sync::read(&self.stocks).contains_key(symbol)
    }

    pub fn quote(&self, symbol: &Symbol) -> Result<Stock> {
        let slot = self.slot(symbol)?;
        let stock = sync::lock(&slot).clone();
        Ok(stock)
    }

    /// Every stock, ordered by symbol.
    pub fn list(&self) -> Vec<Stock> {
        let mut quotes: Vec<Stock> = self
            .slots()
            .iter()
            .map(|slot| sync::lock(slot).clone())
            .collect();
        quotes.sort_by(|a, b| a.symbol().cmp(b.symbol()));
        quotes
    }

    /// Distinct sectors, sorted.
    pub fn sectors(&self) -> Vec<String> {
        let sectors: BTreeSet<String> = self
            .slots()
            .iter()
            .map(|slot| sync::lock(slot).sector().to_string())
            .collect();
        sectors.into_iter().collect()
    }

    pub fn symbols_in_sector(&self, sector: &str) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self
            .slots()
            .iter()
            .filter_map(|slot| {
                let stock = sync::lock(slot);
                (stock.sector() == sector).then(|| stock.symbol().clone())
            })
            .collect();
        symbols.sort();
        symbols
    }

    /// Moves the price of `symbol` to `new_price`.
    pub fn apply_price_change(&self, symbol: &Symbol, new_price: f64) -> Result<Stock> {
        self.update_with(symbol, |_| new_price)
    }

    /// Computes the next price from the current record under the symbol lock,
    /// then stages, persists and publishes it.
    pub fn update_with(&self, symbol: &Symbol, next_price: impl FnOnce(&Stock) -> f64) -> Result<Stock> {
        let slot = self.slot(symbol)?;
        let mut current = sync::lock(&slot);

        let staged = Self::stage(&current, next_price(&*current))?;
        self.store.persist_stock(&staged)?;
        *current = staged.clone();
        Ok(staged)
    }

    pub(crate) fn slot(&self, symbol: &Symbol) -> Result<Arc<Mutex<Stock>>> {
        sync::read(&self.stocks)
            .get(symbol)
            .cloned()
            .ok_or_else(|| ExchangeError::StockNotFound(symbol.clone()))
    }

    /// Copy of `stock` moved to `new_price`.
    pub(crate) fn stage(stock: &Stock, new_price: f64) -> Result<Stock> {
        if !new_price.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "price",
                value: new_price,
            }
            .into());
        }
        if new_price <= 0.0 {
            warn!(
                "{} priced at {:.4}, buying is suspended until it recovers",
                stock.symbol(),
                new_price
            );
        }
        let mut staged = stock.clone();
        staged.apply_price_change(new_price, chrono::Utc::now().timestamp_millis());
        Ok(staged)
    }

    fn slots(&self) -> Vec<Arc<Mutex<Stock>>> {
        sync::read(&self.stocks).values().cloned().collect()
    }
}
