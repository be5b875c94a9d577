//! Defines the `TrendFeed` trait for sector interest ingestion.
//!
//! The exchange does no network I/O of its own. Whatever polls the outside
//! world for sector interest implements this trait, and its readings are
//! handed to the exchange one sector at a time.

use crate::model::trend::SectorReading;

/// A source of sector interest readings.
///
/// # Examples
///
/// ```
/// use market::model::trend::SectorReading;
/// use market::traits::trend_feed::TrendFeed;
///
/// struct Flat;
///
/// impl TrendFeed for Flat {
///     fn next_readings(&mut self, sectors: &[String]) -> Vec<SectorReading> {
///         sectors.iter().map(|s| SectorReading::new(s.clone(), 50.0)).collect()
///     }
/// }
///
/// let readings = Flat.next_readings(&["energy".to_string()]);
/// assert_eq!(readings[0].interest, 50.0);
/// ```
pub trait TrendFeed {
    /// Produces the next reading for each requested sector.
    ///
    /// Sectors the source has no data for are simply omitted; the exchange
    /// treats delivery as best-effort.
    fn next_readings(&mut self, sectors: &[String]) -> Vec<SectorReading>;
}
