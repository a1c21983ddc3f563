//! Daily price/volume observation.

use chrono::NaiveDate;

/// One (date, closing price, volume) sample for a symbol.
///
/// `volume` is kept as `f64` to match how sources report it; it is a whole
/// share count in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

impl DailyObservation {
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}
