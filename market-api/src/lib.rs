//! # Market
//!
//! Domain model shared by the Gourd exchange crates.
//!
//! ## Modules
//! - `model`: Stocks, accounts, transactions and the valuation views.
//! - `error`: The exchange error taxonomy.
//! - `traits`: Contracts for external collaborators (sector trend feeds).

pub mod error;
pub mod model;
pub mod traits;

pub use error::{ExchangeError, Result, StoreError, ValidationError};
pub use model::account::{Account, Positions};
pub use model::identity::UserId;
pub use model::stock::Stock;
pub use model::symbol::Symbol;
pub use model::transaction::{Side, Transaction};
pub use model::trend::SectorReading;
pub use model::valuation::{Holding, LeaderboardEntry, TradeReceipt};
pub use traits::trend_feed::TrendFeed;
