//! Bulk observation source port trait.

use crate::domain::error::PortfolioError;
use crate::domain::ingest::{DateFormat, RawObservation};
use chrono::NaiveDate;

pub trait ObservationSource {
    /// Layout of the date strings this source produces.
    fn date_format(&self) -> DateFormat;

    /// Raw triples for `symbol`, limited to `[start, end]` where given.
    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, PortfolioError>;
}
