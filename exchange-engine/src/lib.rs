//! # Exchange Engine
//!
//! Trading ledger and pricing engine of the Gourd stock game.
//!
//! ## Modules
//! - `engine`: The [`Engine`] facade every outer layer talks to.
//! - `ledger`: Accounts, buys and sells, the transaction history.
//! - `quotes` / `pricing`: Current prices and how they move.
//! - `valuation`: Net worth and the leaderboard.
//! - `store`: Persistence boundary, in memory or as a JSON file.
//! - `settings`: Configuration from file and environment.

pub mod catalog;
pub mod engine;
pub mod feed;
pub mod io;
pub mod ledger;
pub mod pricing;
pub mod quotes;
pub mod retry;
pub mod settings;
pub mod shock;
pub mod store;
pub mod trends;
pub mod valuation;

mod sync;

pub use engine::Engine;
pub use settings::Settings;
