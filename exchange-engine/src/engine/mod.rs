use crate::catalog;
use crate::ledger::Ledger;
use crate::pricing::PricingEngine;
use crate::quotes::QuoteStore;
use crate::settings::Settings;
use crate::shock::ShockSource;
use crate::store::Store;
use crate::trends::InterestBoard;
use crate::valuation::Valuation;
use log::{debug, info, warn};
use market::{
    Account, ExchangeError, Holding, LeaderboardEntry, Result, SectorReading, Stock, Symbol,
    TradeReceipt, Transaction, UserId, ValidationError,
};
use std::sync::Arc;

/// The exchange: quotes, pricing, ledger and valuation wired over one store.
///
/// Every method takes `&self`; an `Engine` is shared across threads behind an
/// `Arc`.
pub struct Engine {
    settings: Settings,
    quotes: Arc<QuoteStore>,
    pricing: Arc<PricingEngine>,
    ledger: Arc<Ledger>,
    valuation: Valuation,
    trends: InterestBoard,
}

impl Engine {
    /// Opens the exchange over `store`, listing any stock of the configured
    /// catalog that the store does not already hold.
    pub fn new(
        settings: Settings,
        store: Arc<dyn Store>,
        shocks: Box<dyn ShockSource>,
    ) -> anyhow::Result<Self> {
        let entries = match &settings.storage.catalog_path {
            Some(path) => catalog::load_catalog(path)?,
            None => catalog::default_catalog(),
        };
        let stocks = catalog::into_stocks(entries)?;
        Ok(Self::with_catalog(settings, store, shocks, stocks)?)
    }

    pub fn with_catalog(
        settings: Settings,
        store: Arc<dyn Store>,
        shocks: Box<dyn ShockSource>,
        catalog: Vec<Stock>,
    ) -> Result<Self> {
        settings.validate()?;
        let snapshot = store.load()?;

        let quotes = Arc::new(QuoteStore::new(store.clone()));
        for stock in snapshot.stocks {
            quotes.seed(stock)?;
        }
        let mut listed = 0;
        for stock in catalog {
            if !quotes.contains(stock.symbol()) {
                quotes.list_stock(stock)?;
                listed += 1;
            }
        }
        if listed > 0 {
            info!("Listed {listed} new stocks from the catalog");
        }

        let pricing = Arc::new(PricingEngine::new(
            quotes.clone(),
            settings.pricing.clone(),
            shocks,
        ));
        let ledger = Arc::new(Ledger::restore(
            quotes.clone(),
            pricing.clone(),
            store,
            settings.ledger.starting_balance,
            snapshot.accounts,
            snapshot.transactions,
        )?);
        let valuation = Valuation::new(ledger.clone(), quotes.clone());

        info!(
            "Exchange ready: {} stocks in {} sectors, {} accounts",
            quotes.list().len(),
            quotes.sectors().len(),
            ledger.accounts().len()
        );

        Ok(Self {
            settings,
            quotes,
            pricing,
            ledger,
            valuation,
            trends: InterestBoard::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // Ledger

    pub fn open_account(&self, username: &str) -> Result<Account> {
        self.ledger.open_account(username)
    }

    pub fn account(&self, user_id: UserId) -> Result<Account> {
        self.ledger.account(user_id)
    }

    /// Every account in opening order.
    pub fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts()
    }

    pub fn balance(&self, user_id: UserId) -> Result<f64> {
        self.ledger.balance(user_id)
    }

    pub fn buy(&self, user_id: UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        self.ledger.buy(user_id, symbol, quantity)
    }

    pub fn sell(&self, user_id: UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        self.ledger.sell(user_id, symbol, quantity)
    }

    pub fn transactions(&self, user_id: Option<UserId>) -> Vec<Transaction> {
        self.ledger.transactions(user_id)
    }

    // Quotes

    pub fn quote(&self, symbol: &str) -> Result<Stock> {
        self.quotes.quote(&Symbol::parse(symbol)?)
    }

    pub fn quotes(&self) -> Vec<Stock> {
        self.quotes.list()
    }

    pub fn sectors(&self) -> Vec<String> {
        self.quotes.sectors()
    }

    pub fn symbols_in_sector(&self, sector: &str) -> Vec<Symbol> {
        self.quotes.symbols_in_sector(sector)
    }

    // Valuation

    pub fn portfolio(&self, user_id: UserId) -> Result<Vec<Holding>> {
        self.valuation.portfolio(user_id)
    }

    pub fn invested_assets(&self, user_id: UserId) -> Result<f64> {
        self.valuation.invested_assets(user_id)
    }

    pub fn net_worth(&self, user_id: UserId) -> Result<f64> {
        self.valuation.net_worth(user_id)
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.valuation.leaderboard()
    }

    // Trends

    /// Records the interest score of `sector` and re-prices every stock in it.
    ///
    /// Each stock is updated on its own. If some fail, the others still move
    /// and the first failure is returned.
    pub fn ingest_sector_interest(&self, sector: &str, interest: f64) -> Result<Vec<Stock>> {
        let sector = sector.trim();
        if sector.is_empty() {
            return Err(ValidationError::EmptySector.into());
        }
        if !interest.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "interest",
                value: interest,
            }
            .into());
        }

        self.trends.record(SectorReading::new(sector, interest));
        let symbols = self.quotes.symbols_in_sector(sector);
        if symbols.is_empty() {
            debug!("Interest {interest:.2} recorded for '{sector}', no listed stocks");
        }

        let outcome = self.reprice(symbols.into_iter().map(|s| (s, interest)));
        if outcome.is_ok() {
            info!("Sector '{sector}' repriced at interest {interest:.2}");
        }
        outcome
    }

    /// Last interest score reported for `sector`, 0 if none.
    pub fn sector_interest(&self, sector: &str) -> f64 {
        self.trends.interest(sector.trim())
    }

    pub fn sector_readings(&self) -> Vec<SectorReading> {
        self.trends.readings()
    }

    /// Re-prices every listed stock from its sector's last recorded interest.
    pub fn run_periodic_update(&self) -> Result<Vec<Stock>> {
        let targets: Vec<(Symbol, f64)> = self
            .quotes
            .list()
            .into_iter()
            .map(|stock| {
                let interest = self.trends.interest(stock.sector());
                (stock.symbol().clone(), interest)
            })
            .collect();
        debug!("Periodic update over {} stocks", targets.len());
        self.reprice(targets.into_iter())
    }

    fn reprice(&self, targets: impl Iterator<Item = (Symbol, f64)>) -> Result<Vec<Stock>> {
        let mut updated = Vec::new();
        let mut first_error: Option<ExchangeError> = None;

        for (symbol, interest) in targets {
            match self.pricing.apply_periodic_update(&symbol, interest) {
                Ok(stock) => updated.push(stock),
                Err(e) => {
                    warn!("Periodic update of {symbol} failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(updated),
        }
    }
}
