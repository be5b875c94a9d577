//! Persistence boundary.
//!
//! The engine writes through a [`Store`] before publishing any change to its
//! in-memory state. A failed write leaves memory untouched and surfaces as
//! [`market::ExchangeError::TransientStore`].

use market::{Account, Stock, StoreError, Transaction, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Everything a committed trade changes, written as one unit.
#[derive(Debug, Clone, Copy)]
pub struct TradeCommit<'a> {
    pub account: &'a Account,
    pub stock: &'a Stock,
    pub transaction: &'a Transaction,
}

pub trait Store: Send + Sync {
    /// Returns the full persisted state. A fresh store yields an empty snapshot.
    fn load(&self) -> Result<Snapshot, StoreError>;

    fn persist_stock(&self, stock: &Stock) -> Result<(), StoreError>;

    fn persist_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Persists the account, the stock and the transaction of one trade, all or
    /// nothing.
    fn persist_trade(&self, commit: &TradeCommit<'_>) -> Result<(), StoreError>;
}

/// Serialized state of the exchange.
///
/// Accounts are kept in opening order and transactions in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub stocks: Vec<Stock>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    /// Checks every record and the cross-record uniqueness rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut symbols = HashSet::new();
        for stock in &self.stocks {
            stock.validate()?;
            if !symbols.insert(stock.symbol()) {
                return Err(ValidationError::DuplicateSymbol(stock.symbol().clone()));
            }
        }

        let mut usernames = HashSet::new();
        for account in &self.accounts {
            account.validate()?;
            if !usernames.insert(account.username()) {
                return Err(ValidationError::DuplicateUsername(
                    account.username().to_string(),
                ));
            }
        }

        for tx in &self.transactions {
            if !tx.price().is_finite() {
                return Err(ValidationError::NonFinite {
                    field: "transaction.price",
                    value: tx.price(),
                });
            }
        }
        Ok(())
    }

    pub fn upsert_stock(&mut self, stock: &Stock) {
        match self.stocks.iter_mut().find(|s| s.symbol() == stock.symbol()) {
            Some(slot) => *slot = stock.clone(),
            None => self.stocks.push(stock.clone()),
        }
    }

    pub fn upsert_account(&mut self, account: &Account) {
        match self
            .accounts
            .iter_mut()
            .find(|a| a.user_id() == account.user_id())
        {
            Some(slot) => *slot = account.clone(),
            None => self.accounts.push(account.clone()),
        }
    }

    pub fn apply_trade(&mut self, commit: &TradeCommit<'_>) {
        self.upsert_account(commit.account);
        self.upsert_stock(commit.stock);
        self.transactions.push(commit.transaction.clone());
    }

    pub fn account(&self, user_id: UserId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user_id() == user_id)
    }
}

#[cfg(test)]
mod tests;
