//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::{export_yahoo_csv, CsvSource};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report;
use crate::domain::error::PortfolioError;
use crate::domain::ingest::{ingest_raw, DateFormat, IngestSummary, RawObservation};
use crate::domain::portfolio::Portfolio;
use crate::ports::config_port::ConfigPort;
use crate::ports::persistence_port::PersistencePort;
use crate::ports::source_port::ObservationSource;

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Personal stock portfolio tracker")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Database file, overriding [database] path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start tracking a stock
    Add {
        symbol: String,
        name: String,
        #[arg(default_value_t = 0.0)]
        shares: f64,
    },
    /// Stop tracking a stock and discard its history
    Remove { symbol: String },
    /// Add shares to a holding
    Buy { symbol: String, shares: f64 },
    /// Remove shares from a holding
    Sell { symbol: String, shares: f64 },
    /// Record one day's closing price and volume (date as m/d/yy)
    Record {
        symbol: String,
        date: String,
        price: String,
        volume: String,
    },
    /// Import daily history from a Yahoo!-style CSV file
    Import {
        symbol: String,
        file: PathBuf,
        /// First date to import (m/d/yy)
        #[arg(long)]
        start: Option<String>,
        /// Last date to import (m/d/yy)
        #[arg(long)]
        end: Option<String>,
    },
    /// Write Yahoo!-style CSV files for one or all holdings
    Export {
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List tracked stocks
    List,
    /// Show the daily history of one stock
    Show { symbol: String },
    /// Print the portfolio report
    Report,
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Buy { .. } => "buy",
            Command::Sell { .. } => "sell",
            Command::Record { .. } => "record",
            Command::Import { .. } => "import",
            Command::Export { .. } => "export",
            Command::List => "list",
            Command::Show { .. } => "show",
            Command::Report => "report",
        }
    }
}

/// Settings resolved from the INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub pool_size: u32,
    pub export_dir: PathBuf,
    pub import_date_format: DateFormat,
}

pub fn build_app_config(adapter: &dyn ConfigPort) -> Result<AppConfig, PortfolioError> {
    let pool_size = adapter.get_int("database", "pool_size", 4);
    if !(1..=64).contains(&pool_size) {
        return Err(PortfolioError::ConfigInvalid {
            section: "database".into(),
            key: "pool_size".into(),
            reason: format!("must be between 1 and 64, got {pool_size}"),
        });
    }

    let import_date_format = match adapter.get_string("import", "date_format") {
        Some(s) => s.parse().map_err(|_| PortfolioError::ConfigInvalid {
            section: "import".into(),
            key: "date_format".into(),
            reason: format!("unknown format '{s}' (expected mdy or iso)"),
        })?,
        None => DateFormat::Iso,
    };

    Ok(AppConfig {
        database_path: adapter
            .get_string("database", "path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("stocks.db")),
        pool_size: pool_size as u32,
        export_dir: adapter
            .get_string("export", "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("import_csvs")),
        import_date_format,
    })
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, PortfolioError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()).and_then(|c| build_app_config(&c)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let config = AppConfig {
        database_path: cli.db.unwrap_or(config.database_path),
        ..config
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let store = match SqliteAdapter::open(&config.database_path, config.pool_size) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let stdout = std::io::stdout();
        match run_command(&store, &cli.command, &config, &mut stdout.lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config, cli.command);
        eprintln!("error: sqlite feature is required");
        ExitCode::from(1)
    }
}

/// Load the portfolio, apply `command`, and save if it changed anything.
pub fn run_command(
    store: &dyn PersistencePort,
    command: &Command,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<(), PortfolioError> {
    let mut portfolio = store.load()?;
    tracing::debug!(command = command.label(), holdings = portfolio.len(), "loaded");

    let changed = execute(command, &mut portfolio, config, out)?;
    if changed {
        store.save(&portfolio)?;
        eprintln!("Data saved.");
    }
    Ok(())
}

/// Apply one command to `portfolio`. Returns whether the portfolio changed.
pub fn execute(
    command: &Command,
    portfolio: &mut Portfolio,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<bool, PortfolioError> {
    match command {
        Command::Add {
            symbol,
            name,
            shares,
        } => {
            let holding = portfolio.add_holding(symbol, name, *shares)?;
            writeln!(out, "{} added to portfolio.", holding.symbol())?;
            Ok(true)
        }
        Command::Remove { symbol } => {
            let removed = portfolio.remove_holding(symbol)?;
            writeln!(
                out,
                "{} removed from portfolio ({} data points discarded).",
                removed.symbol(),
                removed.observations().len()
            )?;
            Ok(true)
        }
        Command::Buy { symbol, shares } => {
            let total = portfolio.buy(symbol, *shares)?;
            writeln!(
                out,
                "{} shares added to {}. New total: {}",
                text_report::format_shares(*shares),
                symbol.trim().to_uppercase(),
                text_report::format_shares(total)
            )?;
            Ok(true)
        }
        Command::Sell { symbol, shares } => {
            let total = portfolio.sell(symbol, *shares)?;
            writeln!(
                out,
                "{} shares sold from {}. New total: {}",
                text_report::format_shares(*shares),
                symbol.trim().to_uppercase(),
                text_report::format_shares(total)
            )?;
            Ok(true)
        }
        Command::Record {
            symbol,
            date,
            price,
            volume,
        } => {
            let raw = RawObservation::new(1, date, price, volume);
            let summary = ingest_raw(portfolio, symbol, &[raw], DateFormat::MonthDayYear)?;
            if let Some(skipped) = summary.skipped.into_iter().next() {
                return Err(PortfolioError::InvalidInput {
                    field: "daily data".into(),
                    reason: skipped.reason,
                });
            }
            writeln!(out, "Daily data added.")?;
            Ok(true)
        }
        Command::Import {
            symbol,
            file,
            start,
            end,
        } => {
            let start = parse_bound(start.as_deref())?;
            let end = parse_bound(end.as_deref())?;
            let source = CsvSource::file(file).with_date_format(config.import_date_format);
            let summary = import_from(portfolio, &source, symbol, start, end)?;
            write_ingest_summary(out, symbol, &summary)?;
            Ok(summary.applied > 0)
        }
        Command::Export { symbol, output } => {
            let dir = output.as_ref().unwrap_or(&config.export_dir);
            let holdings = match symbol {
                Some(s) => vec![portfolio.find(s).ok_or_else(|| PortfolioError::NotFound {
                    symbol: s.trim().to_uppercase(),
                })?],
                None => portfolio.holdings_sorted(),
            };
            for holding in &holdings {
                let path = export_yahoo_csv(holding, dir)?;
                writeln!(out, "Wrote {}", path.display())?;
            }
            writeln!(
                out,
                "Created {} Yahoo-style CSVs under {}",
                holdings.len(),
                dir.display()
            )?;
            Ok(false)
        }
        Command::List => {
            if portfolio.is_empty() {
                writeln!(out, "No stocks being tracked.")?;
            }
            for holding in portfolio.holdings_sorted() {
                let span = match holding.observations().date_span() {
                    Some((first, last)) => format!(
                        ", {} to {}",
                        DateFormat::MonthDayYear.format(first),
                        DateFormat::MonthDayYear.format(last)
                    ),
                    None => String::new(),
                };
                writeln!(
                    out,
                    "{}: {} - {} shares ({} data points{})",
                    holding.symbol(),
                    holding.name(),
                    text_report::format_shares(holding.shares()),
                    holding.observations().len(),
                    span
                )?;
            }
            Ok(false)
        }
        Command::Show { symbol } => {
            let holding = portfolio.find(symbol).ok_or_else(|| PortfolioError::NotFound {
                symbol: symbol.trim().to_uppercase(),
            })?;
            write!(out, "{}", text_report::render_history(holding))?;
            Ok(false)
        }
        Command::Report => {
            write!(out, "{}", text_report::render(&portfolio.report()))?;
            Ok(false)
        }
    }
}

/// Fetch raw observations for `symbol` from `source` and ingest them.
pub fn import_from(
    portfolio: &mut Portfolio,
    source: &dyn ObservationSource,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<IngestSummary, PortfolioError> {
    if !portfolio.contains(symbol) {
        return Err(PortfolioError::NotFound {
            symbol: symbol.trim().to_uppercase(),
        });
    }
    let raws = source.fetch(symbol, start, end)?;
    ingest_raw(portfolio, symbol, &raws, source.date_format())
}

fn parse_bound(input: Option<&str>) -> Result<Option<NaiveDate>, PortfolioError> {
    input
        .map(|s| DateFormat::MonthDayYear.parse(s))
        .transpose()
}

fn write_ingest_summary(
    out: &mut dyn Write,
    symbol: &str,
    summary: &IngestSummary,
) -> Result<(), PortfolioError> {
    writeln!(
        out,
        "Imported {} records for {} ({} skipped).",
        summary.applied,
        symbol.trim().to_uppercase(),
        summary.skipped.len()
    )?;
    for skipped in &summary.skipped {
        writeln!(out, "  record {}: {}", skipped.record, skipped.reason)?;
    }
    Ok(())
}
