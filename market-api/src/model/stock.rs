//! Listed stock and its quote bookkeeping.

use crate::error::ValidationError;
use crate::model::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// A fictional listed stock.
///
/// The price fields (`price`, `high`, `low`, `change`, `last_update`) only move
/// together through [`Stock::apply_price_change`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    symbol: Symbol,
    name: String,
    sector: String,
    price: f64,
    high: f64,
    low: f64,
    change: f64,
    /// Multiplier applied to the random shock of a periodic update.
    volatility_factor: f64,
    /// Signed drift added on every periodic update.
    trend_bias: f64,
    /// Unix millis of the last price change.
    last_update: i64,
}

impl Stock {
    /// Lists a new stock at `price`, with `high` and `low` opened at that price.
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        sector: impl Into<String>,
        price: f64,
        volatility_factor: f64,
        trend_bias: f64,
    ) -> Result<Self, ValidationError> {
        let stock = Self {
            symbol,
            name: name.into(),
            sector: sector.into(),
            price,
            high: price,
            low: price,
            change: 0.0,
            volatility_factor,
            trend_bias,
            last_update: chrono::Utc::now().timestamp_millis(),
        };
        stock.validate()?;
        Ok(stock)
    }

    /// Checks the record invariants. Used on construction and on every record
    /// read back from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sector.trim().is_empty() {
            return Err(ValidationError::EmptySector);
        }
        for (field, value) in [
            ("price", self.price),
            ("high", self.high),
            ("low", self.low),
            ("change", self.change),
            ("volatility_factor", self.volatility_factor),
            ("trend_bias", self.trend_bias),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
        }
        if self.volatility_factor < 0.0 {
            return Err(ValidationError::Negative {
                field: "volatility_factor",
                value: self.volatility_factor,
            });
        }
        if !(self.low <= self.price && self.price <= self.high) {
            return Err(ValidationError::InconsistentRange {
                symbol: self.symbol.clone(),
                low: self.low,
                price: self.price,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Moves the price and keeps `high`, `low`, `change` and `last_update`
    /// consistent with it.
    pub fn apply_price_change(&mut self, new_price: f64, timestamp: i64) {
        self.change = new_price - self.price;
        self.price = new_price;
        self.high = self.high.max(new_price);
        self.low = self.low.min(new_price);
        self.last_update = timestamp;
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn change(&self) -> f64 {
        self.change
    }

    pub fn volatility_factor(&self) -> f64 {
        self.volatility_factor
    }

    pub fn trend_bias(&self) -> f64 {
        self.trend_bias
    }

    pub fn last_update(&self) -> i64 {
        self.last_update
    }
}
