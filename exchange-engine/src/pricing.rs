//! Price formation: trade impact and the periodic interest/noise update.

use crate::quotes::QuoteStore;
use crate::settings::PricingSettings;
use crate::shock::ShockSource;
use log::debug;
use market::{Result, Side, Stock, Symbol, ValidationError};
use std::sync::Arc;

pub struct PricingEngine {
    quotes: Arc<QuoteStore>,
    settings: PricingSettings,
    shocks: Box<dyn ShockSource>,
}

impl PricingEngine {
    pub fn new(
        quotes: Arc<QuoteStore>,
        settings: PricingSettings,
        shocks: Box<dyn ShockSource>,
    ) -> Self {
        Self {
            quotes,
            settings,
            shocks,
        }
    }

    /// Price after a trade of `quantity` shares: buys push it up, sells down.
    pub fn impacted_price(&self, price: f64, quantity: u64, side: Side) -> f64 {
        let delta = self.settings.impact_coefficient * quantity as f64;
        self.floor(price + side.sign() * delta)
    }

    /// Next price of `stock` given the interest score of its sector.
    pub fn periodic_price(&self, stock: &Stock, interest: f64) -> f64 {
        let price = stock.price();
        let shock = self.shocks.draw(self.settings.shock_bound);
        let next = price
            + interest * self.settings.interest_coefficient
            + price * shock * stock.volatility_factor()
            + stock.trend_bias();
        self.floor(next)
    }

    pub fn apply_trade_impact(&self, symbol: &Symbol, quantity: u64, side: Side) -> Result<Stock> {
        let stock = self
            .quotes
            .update_with(symbol, |s| self.impacted_price(s.price(), quantity, side))?;
        debug!("{side} impact on {symbol}: now {:.4}", stock.price());
        Ok(stock)
    }

    pub fn apply_periodic_update(&self, symbol: &Symbol, interest: f64) -> Result<Stock> {
        if !interest.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "interest",
                value: interest,
            }
            .into());
        }
        let stock = self
            .quotes
            .update_with(symbol, |s| self.periodic_price(s, interest))?;
        debug!(
            "Periodic update on {symbol} (interest {interest:.2}): now {:.4}",
            stock.price()
        );
        Ok(stock)
    }

    fn floor(&self, price: f64) -> f64 {
        match self.settings.price_floor {
            Some(floor) => price.max(floor),
            None => price,
        }
    }
}
