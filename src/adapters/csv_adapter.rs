//! Yahoo!-style CSV import and export.
//!
//! Files have the header `Date,Open,High,Low,Close,Adj Close,Volume` with ISO
//! dates. Only `Date`, `Close` and `Volume` are read.

use crate::domain::error::PortfolioError;
use crate::domain::holding::Holding;
use crate::domain::ingest::{DateFormat, RawObservation};
use crate::ports::source_port::ObservationSource;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const YAHOO_HEADER: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

enum Location {
    File(PathBuf),
    Directory(PathBuf),
}

pub struct CsvSource {
    location: Location,
    date_format: DateFormat,
}

impl CsvSource {
    /// Read every symbol from one file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            date_format: DateFormat::Iso,
        }
    }

    /// Read `<SYMBOL>_yahoo.csv` from `dir`.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Directory(dir.into()),
            date_format: DateFormat::Iso,
        }
    }

    /// Override the date layout for files that were not saved by Yahoo!.
    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        match &self.location {
            Location::File(path) => path.clone(),
            Location::Directory(dir) => dir.join(file_name(symbol)),
        }
    }
}

fn file_name(symbol: &str) -> String {
    format!("{}_yahoo.csv", symbol.trim().to_uppercase())
}

fn import_error(path: &Path, reason: impl Into<String>) -> PortfolioError {
    PortfolioError::Import {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize, PortfolioError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| import_error(path, format!("missing {name} column")))
}

impl ObservationSource for CsvSource {
    fn date_format(&self) -> DateFormat {
        self.date_format
    }

    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, PortfolioError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| import_error(&path, format!("failed to read: {e}")))?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| import_error(&path, format!("bad header: {e}")))?
            .clone();
        let date_col = column(&headers, "Date", &path)?;
        let close_col = column(&headers, "Close", &path)?;
        let volume_col = column(&headers, "Volume", &path)?;

        let mut raws = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record_no = i + 1;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    // passed through empty so the ingestion boundary reports it
                    tracing::debug!(record = record_no, error = %e, "unreadable csv row");
                    csv::StringRecord::new()
                }
            };
            let date = record.get(date_col).unwrap_or_default();

            if let Ok(parsed) = self.date_format.parse(date) {
                if start.is_some_and(|s| parsed < s) || end.is_some_and(|e| parsed > e) {
                    continue;
                }
            }

            raws.push(RawObservation::new(
                record_no,
                date,
                record.get(close_col).unwrap_or_default(),
                record.get(volume_col).unwrap_or_default(),
            ));
        }

        tracing::debug!(symbol, path = %path.display(), rows = raws.len(), "read csv");
        Ok(raws)
    }
}

/// Write `holding`'s observations to `<dir>/<SYMBOL>_yahoo.csv`, oldest first.
/// The close fills every price column and volume is written as a whole number.
pub fn export_yahoo_csv(holding: &Holding, dir: &Path) -> Result<PathBuf, PortfolioError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(holding.symbol()));
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|e| import_error(&path, format!("failed to create: {e}")))?;

    let write_err = |e: csv::Error| import_error(&path, format!("write failed: {e}"));
    wtr.write_record(YAHOO_HEADER).map_err(write_err)?;
    for obs in holding.observations().iter() {
        let date = DateFormat::Iso.format(obs.date);
        let price = format!("{:.2}", obs.close);
        let volume = (obs.volume as u64).to_string();
        let price = price.as_str();
        wtr.write_record([date.as_str(), price, price, price, price, price, volume.as_str()])
            .map_err(write_err)?;
    }
    wtr.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::DailyObservation;
    use tempfile::TempDir;

    const AAPL_CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
        2024-01-02,99.0,101.0,98.0,100.00,100.00,1000\n\
        2024-01-03,100.0,111.0,99.0,110.00,110.00,1200\n\
        2024-01-04,null,null,null,null,null,null\n\
        2024-01-05,109.0,112.0,108.0,108.50,108.50,900\n";

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("AAPL_yahoo.csv"), AAPL_CSV).unwrap();
        dir
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_reads_date_close_volume() {
        let dir = setup();
        let source = CsvSource::directory(dir.path());

        let raws = source.fetch("aapl", None, None).unwrap();

        assert_eq!(raws.len(), 4);
        assert_eq!(raws[0], RawObservation::new(1, "2024-01-02", "100.00", "1000"));
        assert_eq!(raws[2], RawObservation::new(3, "2024-01-04", "null", "null"));
        assert_eq!(source.date_format(), DateFormat::Iso);
    }

    #[test]
    fn fetch_filters_by_date_range() {
        let dir = setup();
        let source = CsvSource::file(dir.path().join("AAPL_yahoo.csv"));

        let raws = source.fetch("AAPL", Some(date(3)), Some(date(4))).unwrap();

        let records: Vec<_> = raws.iter().map(|r| r.record).collect();
        assert_eq!(records, vec![2, 3]);
    }

    #[test]
    fn fetch_missing_file_is_import_error() {
        let dir = setup();
        let source = CsvSource::directory(dir.path());
        let err = source.fetch("MSFT", None, None).unwrap_err();
        assert!(matches!(err, PortfolioError::Import { .. }));
    }

    #[test]
    fn fetch_missing_close_column_is_import_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,Open,Volume\n2024-01-02,1.0,10\n").unwrap();
        let err = CsvSource::file(&path).fetch("X", None, None).unwrap_err();
        assert!(err.to_string().contains("missing Close column"));
    }

    #[test]
    fn fetch_short_rows_pass_through_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "Date,Close,Volume\n2024-01-02,100.0\n").unwrap();
        let raws = CsvSource::file(&path).fetch("X", None, None).unwrap();
        assert_eq!(raws, vec![RawObservation::new(1, "2024-01-02", "100.0", "")]);
    }

    #[test]
    fn with_date_format_filters_in_that_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.csv");
        fs::write(&path, "Date,Close,Volume\n1/2/24,100,10\n1/9/24,101,11\n").unwrap();
        let source = CsvSource::file(&path).with_date_format(DateFormat::MonthDayYear);

        let raws = source.fetch("X", None, Some(date(5))).unwrap();

        assert_eq!(source.date_format(), DateFormat::MonthDayYear);
        assert_eq!(raws, vec![RawObservation::new(1, "1/2/24", "100", "10")]);
    }

    #[test]
    fn export_writes_sorted_yahoo_rows() {
        let dir = TempDir::new().unwrap();
        let mut holding = Holding::new("msft", "Microsoft", 3.0);
        holding.add_observation(DailyObservation::new(date(3), 370.456, 1500.9));
        holding.add_observation(DailyObservation::new(date(2), 368.0, 1200.0));

        let path = export_yahoo_csv(&holding, &dir.path().join("out")).unwrap();

        assert!(path.ends_with("MSFT_yahoo.csv"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,368.00,368.00,368.00,368.00,368.00,1200\n\
             2024-01-03,370.46,370.46,370.46,370.46,370.46,1500\n"
        );
    }

    #[test]
    fn export_then_fetch_recovers_closes() {
        let dir = TempDir::new().unwrap();
        let mut holding = Holding::new("IBM", "IBM", 1.0);
        holding.add_observation(DailyObservation::new(date(2), 160.25, 400.0));

        export_yahoo_csv(&holding, dir.path()).unwrap();
        let raws = CsvSource::directory(dir.path()).fetch("ibm", None, None).unwrap();

        assert_eq!(raws, vec![RawObservation::new(1, "2024-01-02", "160.25", "400")]);
    }
}
