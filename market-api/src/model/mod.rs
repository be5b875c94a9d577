pub mod account;
pub mod identity;
pub mod stock;
pub mod symbol;
pub mod transaction;
pub mod trend;
pub mod valuation;
