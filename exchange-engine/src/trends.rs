use crate::sync;
use market::SectorReading;
use std::collections::HashMap;
use std::sync::RwLock;

/// Latest interest reading per sector.
#[derive(Debug, Default)]
pub struct InterestBoard {
    readings: RwLock<HashMap<String, SectorReading>>,
}

impl InterestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the reading for its sector.
    pub fn record(&self, reading: SectorReading) {
        sync::write(&self.readings).insert(reading.sector.clone(), reading);
    }

    /// Last reported interest, 0 for a sector never reported.
    pub fn interest(&self, sector: &str) -> f64 {
        sync::read(&self.readings)
            .get(sector)
            .map_or(0.0, |r| r.interest)
    }

    pub fn readings(&self) -> Vec<SectorReading> {
        let mut readings: Vec<SectorReading> =
            sync::read(&self.readings).values().cloned().collect();
        readings.sort_by(|a, b| a.sector.cmp(&b.sector));
        readings
    }
}
