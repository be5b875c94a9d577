use market::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "GOURD";

fn default_starting_balance() -> f64 {
    10_000.0
}

fn default_impact_coefficient() -> f64 {
    0.1
}

fn default_interest_coefficient() -> f64 {
    0.01
}

fn default_shock_bound() -> f64 {
    0.05
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_max_interest() -> f64 {
    100.0
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting: {0}")]
    Invalid(#[from] ValidationError),
}

/// Account opening rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Cash credited to every new account.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
        }
    }
}

/// Tunables of the two price update algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Price move per share traded.
    #[serde(default = "default_impact_coefficient")]
    pub impact_coefficient: f64,
    /// Price move per point of sector interest.
    #[serde(default = "default_interest_coefficient")]
    pub interest_coefficient: f64,
    /// Random shocks are drawn from `[-shock_bound, shock_bound]`, as a
    /// fraction of the current price.
    #[serde(default = "default_shock_bound")]
    pub shock_bound: f64,
    /// Lowest price either algorithm may produce. Unset means prices are not
    /// clamped.
    #[serde(default)]
    pub price_floor: Option<f64>,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            impact_coefficient: default_impact_coefficient(),
            interest_coefficient: default_interest_coefficient(),
            shock_bound: default_shock_bound(),
            price_floor: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// JSON state file. Unset keeps all state in memory.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    /// Stock catalog to seed from. Unset uses the built-in catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Synthetic trend feed used by the standalone binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_max_interest")]
    pub max_interest: f64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_interest: default_max_interest(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub feed: FeedSettings,
}

impl Settings {
    /// Loads settings from an optional TOML file, then `GOURD_*` environment
    /// variables (`GOURD_PRICING__IMPACT_COEFFICIENT=0.2`).
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_non_negative("ledger.starting_balance", self.ledger.starting_balance)?;
        check_non_negative("pricing.impact_coefficient", self.pricing.impact_coefficient)?;
        check_finite(
            "pricing.interest_coefficient",
            self.pricing.interest_coefficient,
        )?;
        check_non_negative("pricing.shock_bound", self.pricing.shock_bound)?;
        if let Some(floor) = self.pricing.price_floor {
            check_finite("pricing.price_floor", floor)?;
        }
        check_non_negative("feed.max_interest", self.feed.max_interest)?;
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}
