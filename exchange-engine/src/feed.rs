//! Synthetic sector interest for standalone runs.

use market::{SectorReading, TrendFeed};
use rand::Rng;
use std::collections::HashMap;

/// Random walk of each sector's interest within `[0, max_interest]`.
pub struct RandomTrendFeed {
    max_interest: f64,
    levels: HashMap<String, f64>,
}

impl RandomTrendFeed {
    pub fn new(max_interest: f64) -> Self {
        Self {
            max_interest: max_interest.max(0.0),
            levels: HashMap::new(),
        }
    }
}

impl TrendFeed for RandomTrendFeed {
    fn next_readings(&mut self, sectors: &[String]) -> Vec<SectorReading> {
        let mut rng = rand::thread_rng();
        let max = self.max_interest;
        let step = max * 0.1;

        sectors
            .iter()
            .map(|sector| {
                let level = self
                    .levels
                    .entry(sector.clone())
                    .or_insert_with(|| max / 2.0);
                if step > 0.0 {
                    *level = (*level + rng.gen_range(-step..=step)).clamp(0.0, max);
                }
                SectorReading::new(sector.clone(), *level)
            })
            .collect()
    }
}
