//! Per-symbol daily observation series.
//!
//! Observations are keyed by date, so a second observation for a date
//! replaces the first and iteration is always in ascending date order.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::PortfolioError;
use super::observation::DailyObservation;

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    symbol: String,
    by_date: BTreeMap<NaiveDate, DailyObservation>,
}

impl ObservationSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            by_date: BTreeMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Insert an observation, replacing any existing one for the same date.
    /// Returns the replaced observation.
    pub fn insert(&mut self, observation: DailyObservation) -> Option<DailyObservation> {
        let replaced = self.by_date.insert(observation.date, observation);
        if let Some(old) = &replaced {
            tracing::debug!(
                symbol = %self.symbol,
                date = %observation.date,
                old_close = old.close,
                new_close = observation.close,
                "replaced observation"
            );
        }
        replaced
    }

    pub fn bulk_ingest<I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = DailyObservation>,
    {
        let mut applied = 0;
        for obs in observations {
            self.insert(obs);
            applied += 1;
        }
        applied
    }

    /// Observations in ascending date order.
    pub fn sorted(&self) -> Vec<DailyObservation> {
        self.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyObservation> {
        self.by_date.values()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyObservation> {
        self.by_date.get(&date)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn latest(&self) -> Result<&DailyObservation, PortfolioError> {
        self.by_date
            .values()
            .next_back()
            .ok_or_else(|| self.empty_error())
    }

    pub fn earliest(&self) -> Result<&DailyObservation, PortfolioError> {
        self.by_date
            .values()
            .next()
            .ok_or_else(|| self.empty_error())
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.by_date.keys().next()?;
        let last = self.by_date.keys().next_back()?;
        Some((*first, *last))
    }

    /// (minimum close, maximum close)
    pub fn range(&self) -> Result<(f64, f64), PortfolioError> {
        if self.is_empty() {
            return Err(self.empty_error());
        }
        let (min, max) = self
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), obs| {
                (lo.min(obs.close), hi.max(obs.close))
            });
        Ok((min, max))
    }

    pub fn average(&self) -> Result<f64, PortfolioError> {
        if self.is_empty() {
            return Err(self.empty_error());
        }
        let sum: f64 = self.iter().map(|obs| obs.close).sum();
        Ok(sum / self.len() as f64)
    }

    /// Sum of volumes, truncated for display.
    pub fn total_volume(&self) -> u64 {
        let sum: f64 = self.iter().map(|obs| obs.volume).sum();
        sum as u64
    }

    fn empty_error(&self) -> PortfolioError {
        PortfolioError::EmptySeries {
            symbol: self.symbol.clone(),
        }
    }
}
