//! Immutable trade records.

use crate::model::identity::UserId;
use crate::model::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `+1.0` for buys, `-1.0` for sells.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// One committed trade. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: Uuid,
    /// Position in the global log; strictly increasing.
    sequence: u64,
    user_id: UserId,
    symbol: Symbol,
    quantity: u64,
    /// Price per share the trade executed at.
    price: f64,
    total: f64,
    side: Side,
    /// Unix millis.
    timestamp: i64,
}

impl Transaction {
    pub fn new(
        sequence: u64,
        user_id: UserId,
        symbol: Symbol,
        quantity: u64,
        price: f64,
        side: Side,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            user_id,
            symbol,
            quantity,
            price,
            total: price * quantity as f64,
            side,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Cash effect on the account: negative for buys, positive for sells.
    pub fn signed_total(&self) -> f64 {
        -self.side.sign() * self.total
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
