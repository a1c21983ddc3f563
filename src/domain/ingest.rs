//! Ingestion boundary: validates raw source triples before they reach a series.
//!
//! Each source supplies (date, close, volume) strings in its own formatting.
//! Malformed records are skipped and reported; they never abort a batch.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use super::error::PortfolioError;
use super::observation::DailyObservation;
use super::portfolio::Portfolio;

/// Date layout used by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `3/14/24`, used for manual entry.
    #[default]
    MonthDayYear,
    /// `2024-03-14`, used by Yahoo!-style CSV files.
    Iso,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::MonthDayYear => "%m/%d/%y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }

    pub fn parse(self, input: &str) -> Result<NaiveDate, PortfolioError> {
        NaiveDate::parse_from_str(input.trim(), self.pattern()).map_err(|_| {
            PortfolioError::invalid_input(
                "date",
                format!("'{}' does not match {}", input.trim(), self),
            )
        })
    }

    pub fn format(self, date: NaiveDate) -> String {
        match self {
            // no zero padding, matching how dates are typed in
            DateFormat::MonthDayYear => date.format("%-m/%-d/%y").to_string(),
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::MonthDayYear => write!(f, "m/d/yy"),
            DateFormat::Iso => write!(f, "yyyy-mm-dd"),
        }
    }
}

impl FromStr for DateFormat {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mdy" | "m/d/yy" => Ok(DateFormat::MonthDayYear),
            "iso" | "yyyy-mm-dd" => Ok(DateFormat::Iso),
            other => Err(PortfolioError::invalid_input(
                "date_format",
                format!("unknown format '{other}' (expected mdy or iso)"),
            )),
        }
    }
}

/// An unvalidated observation as supplied by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    /// 1-based position in the source, for diagnostics.
    pub record: usize,
    pub date: String,
    pub close: String,
    pub volume: String,
}

impl RawObservation {
    pub fn new(record: usize, date: &str, close: &str, volume: &str) -> Self {
        Self {
            record,
            date: date.to_string(),
            close: close.to_string(),
            volume: volume.to_string(),
        }
    }
}

pub fn parse_close(input: &str) -> Result<f64, PortfolioError> {
    let close: f64 = input.trim().parse().map_err(|_| {
        PortfolioError::invalid_input("price", format!("'{}' is not a number", input.trim()))
    })?;
    if !close.is_finite() || close <= 0.0 {
        return Err(PortfolioError::invalid_input(
            "price",
            format!("must be positive, got {close}"),
        ));
    }
    Ok(close)
}

pub fn parse_volume(input: &str) -> Result<f64, PortfolioError> {
    let volume: f64 = input.trim().parse().map_err(|_| {
        PortfolioError::invalid_input("volume", format!("'{}' is not a number", input.trim()))
    })?;
    if !volume.is_finite() || volume < 0.0 {
        return Err(PortfolioError::invalid_input(
            "volume",
            format!("must be non-negative, got {volume}"),
        ));
    }
    Ok(volume)
}

pub fn parse_observation(
    raw: &RawObservation,
    format: DateFormat,
) -> Result<DailyObservation, PortfolioError> {
    Ok(DailyObservation {
        date: format.parse(&raw.date)?,
        close: parse_close(&raw.close)?,
        volume: parse_volume(&raw.volume)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub record: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    pub applied: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Validate `raws` and merge the good ones into `symbol`'s series.
///
/// Fails only when `symbol` is not tracked; per-record failures end up in
/// [`IngestSummary::skipped`].
pub fn ingest_raw(
    portfolio: &mut Portfolio,
    symbol: &str,
    raws: &[RawObservation],
    format: DateFormat,
) -> Result<IngestSummary, PortfolioError> {
    if !portfolio.contains(symbol) {
        return Err(PortfolioError::NotFound {
            symbol: symbol.trim().to_uppercase(),
        });
    }

    let mut parsed = Vec::with_capacity(raws.len());
    let mut skipped = Vec::new();
    for raw in raws {
        match parse_observation(raw, format) {
            Ok(obs) => parsed.push(obs),
            Err(e) => {
                tracing::warn!(symbol, record = raw.record, error = %e, "skipping record");
                skipped.push(SkippedRecord {
                    record: raw.record,
                    reason: e.to_string(),
                });
            }
        }
    }

    let applied = portfolio.ingest_from_source(symbol, parsed)?;
    Ok(IngestSummary { applied, skipped })
}
