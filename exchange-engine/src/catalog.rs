//! Stocks listed when the exchange starts.

use anyhow::{Context, Result};
use market::{Stock, Symbol, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One line of a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    #[serde(default = "default_volatility")]
    pub volatility_factor: f64,
    #[serde(default)]
    pub trend_bias: f64,
}

fn default_volatility() -> f64 {
    1.0
}

impl CatalogEntry {
    pub fn into_stock(self) -> Result<Stock, ValidationError> {
        Stock::new(
            Symbol::parse(&self.symbol)?,
            self.name,
            self.sector,
            self.price,
            self.volatility_factor,
            self.trend_bias,
        )
    }
}

const DEFAULT_CATALOG: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("GRD", "Gourd Holdings", "agriculture", 120.0, 1.0, 0.0),
    ("PMK", "Pumpkin Patch Foods", "agriculture", 45.5, 1.2, 0.05),
    ("SQS", "Squash Systems", "technology", 210.0, 1.5, 0.1),
    ("VNE", "Vine Networks", "technology", 88.0, 1.3, 0.0),
    ("CLB", "Calabash Energy", "energy", 64.0, 0.8, -0.02),
    ("MLN", "Melon Power", "energy", 32.25, 1.1, 0.0),
    ("ZUC", "Zucchini Health", "healthcare", 150.0, 0.6, 0.03),
    ("CUC", "Cucumber Capital", "finance", 99.0, 0.9, 0.0),
    ("LUF", "Luffa Media", "entertainment", 27.75, 1.8, -0.05),
    ("HRV", "Harvest Logistics", "industrials", 73.0, 0.7, 0.01),
];

/// The built-in catalog.
pub fn default_catalog() -> Vec<CatalogEntry> {
    DEFAULT_CATALOG
        .iter()
        .map(
            |&(symbol, name, sector, price, volatility_factor, trend_bias)| CatalogEntry {
                symbol: symbol.to_string(),
                name: name.to_string(),
                sector: sector.to_string(),
                price,
                volatility_factor,
                trend_bias,
            },
        )
        .collect()
}

/// Reads a JSON array of [`CatalogEntry`].
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    let entries = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    Ok(entries)
}

/// Builds validated stocks from `entries`.
pub fn into_stocks(entries: Vec<CatalogEntry>) -> Result<Vec<Stock>> {
    entries
        .into_iter()
        .map(|entry| {
            let symbol = entry.symbol.clone();
            entry
                .into_stock()
                .with_context(|| format!("Invalid catalog entry {symbol}"))
        })
        .collect()
}
