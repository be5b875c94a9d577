//! Accounts, trades and the transaction history.
//!
//! A trade holds its account lock, then its symbol lock, for the whole
//! read-validate-persist-publish sequence. Nothing takes an account lock while
//! holding a symbol lock, so concurrent trades cannot deadlock, and two trades
//! on one account or one symbol are serialized.

mod accounts;
mod journal;

use crate::pricing::PricingEngine;
use crate::quotes::QuoteStore;
use crate::store::{Store, TradeCommit};
use crate::sync;
use accounts::AccountBook;
use journal::TransactionLog;
use log::{debug, info};
use market::{
    Account, Result, Side, Symbol, TradeReceipt, Transaction, UserId, ValidationError,
};
use std::sync::Arc;

pub struct Ledger {
    accounts: AccountBook,
    journal: TransactionLog,
    quotes: Arc<QuoteStore>,
    pricing: Arc<PricingEngine>,
    store: Arc<dyn Store>,
    starting_balance: f64,
}

impl Ledger {
    /// Builds a ledger over previously persisted accounts and history.
    pub fn restore(
        quotes: Arc<QuoteStore>,
        pricing: Arc<PricingEngine>,
        store: Arc<dyn Store>,
        starting_balance: f64,
        accounts: Vec<Account>,
        history: Vec<Transaction>,
    ) -> Result<Self> {
        let book = AccountBook::default();
        for account in accounts {
            book.insert_with(account, |_| Ok(()))?;
        }
        debug!(
            "Ledger restored with {} accounts and {} transactions",
            book.len(),
            history.len()
        );

        Ok(Self {
            accounts: book,
            journal: TransactionLog::new(history),
            quotes,
            pricing,
            store,
            starting_balance,
        })
    }

    /// Opens an account funded with the starting balance.
    pub fn open_account(&self, username: &str) -> Result<Account> {
        let account = Account::open(username, self.starting_balance)?;
        let account = self
            .accounts
            .insert_with(account, |a| Ok(self.store.persist_account(a)?))?;
        info!(
            "Opened account {} for '{}' with {:.2}",
            account.user_id(),
            account.username(),
            account.balance()
        );
        Ok(account)
    }

    pub fn account(&self, user_id: UserId) -> Result<Account> {
        self.accounts.get(user_id)
    }

    pub fn balance(&self, user_id: UserId) -> Result<f64> {
        Ok(self.accounts.get(user_id)?.balance())
    }

    /// Every account in opening order.
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.snapshot()
    }

    /// History in commit order, optionally for one user.
    pub fn transactions(&self, user_id: Option<UserId>) -> Vec<Transaction> {
        self.journal.list(user_id)
    }

    pub fn buy(&self, user_id: UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        self.trade(user_id, symbol, quantity, Side::Buy)
    }

    pub fn sell(&self, user_id: UserId, symbol: &str, quantity: i64) -> Result<TradeReceipt> {
        self.trade(user_id, symbol, quantity, Side::Sell)
    }

    fn trade(&self, user_id: UserId, symbol: &str, quantity: i64, side: Side) -> Result<TradeReceipt> {
        let quantity = match u64::try_from(quantity) {
            Ok(q) if q > 0 => q,
            _ => return Err(ValidationError::NonPositiveQuantity(quantity).into()),
        };
        let symbol = Symbol::parse(symbol)?;
        let stock_slot = self.quotes.slot(&symbol)?;
        let account_slot = self.accounts.slot(user_id)?;

        let mut account = sync::lock(&account_slot);
        let mut stock = sync::lock(&stock_slot);

        let price = stock.price();
        let total = price * quantity as f64;

        // Buys need a positive price; sells only a non-negative credit.
        let mut staged_account = account.clone();
        match side {
            Side::Buy => {
                if price <= 0.0 {
                    return Err(ValidationError::UntradablePrice { symbol, price }.into());
                }
                staged_account.withdraw(total)?;
                staged_account
                    .positions_mut()
                    .add(symbol.clone(), quantity)?;
            }
            Side::Sell => {
                staged_account.positions_mut().remove(&symbol, quantity)?;
                if price < 0.0 {
                    return Err(ValidationError::UntradablePrice { symbol, price }.into());
                }
                staged_account.deposit(total);
            }
        }
        let staged_stock =
            QuoteStore::stage(&stock, self.pricing.impacted_price(price, quantity, side))?;
        let transaction = Transaction::new(
            self.journal.next_sequence(),
            user_id,
            symbol.clone(),
            quantity,
            price,
            side,
        );

        self.store.persist_trade(&TradeCommit {
            account: &staged_account,
            stock: &staged_stock,
            transaction: &transaction,
        })?;

        *account = staged_account;
        *stock = staged_stock;
        self.journal.append(transaction.clone());

        info!(
            "{} {} {} x{} @ {:.2} (total {:.2}), {} now {:.2}",
            account.username(),
            side,
            symbol,
            quantity,
            price,
            total,
            symbol,
            stock.price()
        );

        let message = match side {
            Side::Buy => "Stock purchased successfully",
            Side::Sell => "Stock sold successfully",
        };
        Ok(TradeReceipt {
            message: message.to_string(),
            transaction,
        })
    }
}
