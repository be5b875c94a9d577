//! Error taxonomy shared by every exchange component.
//!
//! Domain and validation failures are terminal for a request. Only
//! [`ExchangeError::TransientStore`] is worth retrying, and only by the caller.

use crate::model::identity::UserId;
use crate::model::symbol::Symbol;
use thiserror::Error;

/// Input or record that violates a model invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("symbol is {len} characters long, max is {max}")]
    SymbolTooLong { len: usize, max: usize },

    #[error("symbol must start with a letter, found '{ch}'")]
    SymbolInvalidStart { ch: char },

    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("quantity must be a positive integer, got {0}")]
    NonPositiveQuantity(i64),

    #[error("quantity overflow for {symbol}")]
    QuantityOverflow { symbol: Symbol },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("sector must not be empty")]
    EmptySector,

    #[error("stock {symbol} has inconsistent range: low {low}, price {price}, high {high}")]
    InconsistentRange {
        symbol: Symbol,
        low: f64,
        price: f64,
        high: f64,
    },

    #[error("position {symbol} stored with zero quantity")]
    ZeroPosition { symbol: Symbol },

    #[error("stock {0} is listed twice")]
    DuplicateSymbol(Symbol),

    #[error("stock {symbol} is quoted at {price:.2} and cannot be traded")]
    UntradablePrice { symbol: Symbol, price: f64 },
}

/// Failure reported by the persistence boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store could not complete the write or read.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record failed validation when loaded.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

/// Every failure the ledger, pricing engine and valuation can surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("stock '{0}' not found")]
    StockNotFound(Symbol),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("insufficient holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: Symbol,
        requested: u64,
        held: u64,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("transient store failure: {0}")]
    TransientStore(#[from] StoreError),
}

impl ExchangeError {
    /// Whether a caller may retry the same request.
    ///
    /// Retrying a domain or validation error would produce the same outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExchangeError::TransientStore(_))
    }
}

/// Result alias used throughout the exchange crates.
pub type Result<T> = std::result::Result<T, ExchangeError>;
