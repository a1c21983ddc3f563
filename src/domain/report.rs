//! Per-holding report structures.

use chrono::NaiveDate;

use super::holding::Holding;

/// Derived metrics for a holding with at least one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingSummary {
    pub records: usize,
    pub latest_date: NaiveDate,
    pub latest_close: f64,
    pub min_close: f64,
    pub max_close: f64,
    pub average_close: f64,
    pub total_volume: u64,
    pub market_value: f64,
    pub profit_loss: f64,
    /// `None` when the cost basis is zero.
    pub profit_loss_percent: Option<f64>,
}

impl HoldingSummary {
    /// Returns `None` when the holding has no observations.
    pub fn compute(holding: &Holding) -> Option<Self> {
        let series = holding.observations();
        let latest = series.latest().ok()?;
        let (min_close, max_close) = series.range().ok()?;
        Some(HoldingSummary {
            records: series.len(),
            latest_date: latest.date,
            latest_close: latest.close,
            min_close,
            max_close,
            average_close: series.average().ok()?,
            total_volume: series.total_volume(),
            market_value: holding.market_value().ok()?,
            profit_loss: holding.profit_loss().ok()?,
            profit_loss_percent: holding.profit_loss_percent().ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub symbol: String,
    pub name: String,
    pub shares: f64,
    /// `None` marks a holding with no data.
    pub summary: Option<HoldingSummary>,
}

impl ReportEntry {
    pub fn has_data(&self) -> bool {
        self.summary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::DailyObservation;
    use approx::assert_relative_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn compute_empty_holding_is_none() {
        let holding = Holding::new("AAPL", "Apple", 10.0);
        assert!(HoldingSummary::compute(&holding).is_none());
    }

    #[test]
    fn compute_collects_metrics() {
        let mut holding = Holding::new("AAPL", "Apple", 10.0);
        holding.add_observation(DailyObservation::new(date(3), 110.0, 1200.0));
        holding.add_observation(DailyObservation::new(date(2), 100.0, 1000.0));

        let summary = HoldingSummary::compute(&holding).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.latest_date, date(3));
        assert_relative_eq!(summary.latest_close, 110.0);
        assert_relative_eq!(summary.min_close, 100.0);
        assert_relative_eq!(summary.max_close, 110.0);
        assert_relative_eq!(summary.average_close, 105.0);
        assert_eq!(summary.total_volume, 2200);
        assert_relative_eq!(summary.market_value, 1100.0);
        assert_relative_eq!(summary.profit_loss, 100.0);
        assert_relative_eq!(summary.profit_loss_percent.unwrap(), 10.0);
    }

    #[test]
    fn compute_zero_shares_has_no_percent() {
        let mut holding = Holding::new("AAPL", "Apple", 0.0);
        holding.add_observation(DailyObservation::new(date(2), 100.0, 1000.0));
        let summary = HoldingSummary::compute(&holding).unwrap();
        assert_eq!(summary.profit_loss, 0.0);
        assert!(summary.profit_loss_percent.is_none());
    }
}
