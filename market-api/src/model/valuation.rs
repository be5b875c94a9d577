//! Read-only views handed to the outer layers.

use crate::model::symbol::Symbol;
use crate::model::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// One position marked at the current quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    pub quantity: u64,
    pub mark_price: f64,
    pub market_value: f64,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub username: String,
    pub liquid_assets: f64,
    pub invested_assets: f64,
    pub net_worth: f64,
}

/// Outcome of a committed buy or sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub message: String,
    pub transaction: Transaction,
}
