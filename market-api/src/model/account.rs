//! Player accounts: cash balance and stock positions.

use crate::error::{ExchangeError, ValidationError};
use crate::model::identity::UserId;
use crate::model::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Held quantities keyed by symbol.
///
/// A symbol whose quantity reaches zero is removed, so every stored quantity
/// is at least one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Positions {
    holdings: BTreeMap<Symbol, u64>,
}

impl Positions {
    pub fn quantity(&self, symbol: &Symbol) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// Adds `quantity` to the position, opening it if absent.
    pub fn add(&mut self, symbol: Symbol, quantity: u64) -> Result<(), ValidationError> {
        let held = self.quantity(&symbol);
        let updated = held
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::QuantityOverflow {
                symbol: symbol.clone(),
            })?;
        self.holdings.insert(symbol, updated);
        Ok(())
    }

    /// Removes `quantity` from the position, dropping the entry at zero.
    pub fn remove(&mut self, symbol: &Symbol, quantity: u64) -> Result<(), ExchangeError> {
        let held = self.quantity(symbol);
        if held < quantity {
            return Err(ExchangeError::InsufficientHoldings {
                symbol: symbol.clone(),
                requested: quantity,
                held,
            });
        }
        if held == quantity {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.clone(), held - quantity);
        }
        Ok(())
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, Symbol, u64> {
        self.holdings.iter()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// One player's ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    user_id: UserId,
    username: String,
    balance: f64,
    positions: Positions,
    /// Unix millis of registration.
    created_at: i64,
}

impl Account {
    /// Opens an account with `starting_balance` in cash and no positions.
    pub fn open(username: impl Into<String>, starting_balance: f64) -> Result<Self, ValidationError> {
        let account = Self {
            user_id: UserId::generate(),
            username: username.into().trim().to_string(),
            balance: starting_balance,
            positions: Positions::default(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        account.validate()?;
        Ok(account)
    }

    /// Checks the record invariants: non-empty username, finite non-negative
    /// balance, no zero-quantity positions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if !self.balance.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "balance",
                value: self.balance,
            });
        }
        if self.balance < 0.0 {
            return Err(ValidationError::Negative {
                field: "balance",
                value: self.balance,
            });
        }
        if let Some((symbol, _)) = self.positions.iter().find(|(_, qty)| **qty == 0) {
            return Err(ValidationError::ZeroPosition {
                symbol: symbol.clone(),
            });
        }
        Ok(())
    }

    pub fn deposit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Debits `amount`, refusing to take the balance below zero.
    pub fn withdraw(&mut self, amount: f64) -> Result<(), ExchangeError> {
        if self.balance < amount {
            return Err(ExchangeError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut Positions {
        &mut self.positions
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}
