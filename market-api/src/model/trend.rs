//! Sector interest readings supplied by the external trend poller.

use serde::{Deserialize, Serialize};

/// Latest interest score observed for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorReading {
    pub sector: String,
    pub interest: f64,
    /// Unix millis when the reading was taken.
    pub timestamp: i64,
}

impl SectorReading {
    pub fn new(sector: impl Into<String>, interest: f64) -> Self {
        Self {
            sector: sector.into(),
            interest,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
