//! SQLite persistence adapter.

use crate::domain::error::PortfolioError;
use crate::domain::holding::Holding;
use crate::domain::observation::DailyObservation;
use crate::domain::portfolio::Portfolio;
use crate::ports::persistence_port::PersistencePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn db_err(e: r2d2::Error) -> PortfolioError {
    PortfolioError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> PortfolioError {
    PortfolioError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    /// Open (creating if needed) the database file and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, PortfolioError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_err)?;
        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, PortfolioError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(db_err)?;
        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, PortfolioError> {
        self.pool.get().map_err(db_err)
    }

    pub fn initialize_schema(&self) -> Result<(), PortfolioError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS stocks (
                    symbol TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL,
                    shares REAL NOT NULL
                );
                CREATE TABLE IF NOT EXISTS daily_data (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    price REAL NOT NULL,
                    volume REAL NOT NULL,
                    PRIMARY KEY (symbol, date)
                );",
            )
            .map_err(query_err)
    }
}

impl PersistencePort for SqliteAdapter {
    fn load(&self) -> Result<Portfolio, PortfolioError> {
        let conn = self.conn()?;
        let mut portfolio = Portfolio::new();

        let mut stmt = conn
            .prepare("SELECT symbol, name, shares FROM stocks")
            .map_err(query_err)?;
        let stocks = stmt
            .query_map([], |row| {
                Ok(Holding::new(
                    &row.get::<_, String>(0)?,
                    &row.get::<_, String>(1)?,
                    row.get(2)?,
                ))
            })
            .map_err(query_err)?;
        for holding in stocks {
            portfolio.insert_holding(holding.map_err(query_err)?)?;
        }

        let mut stmt = conn
            .prepare("SELECT symbol, date, price, volume FROM daily_data")
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                let symbol: String = row.get(0)?;
                let date_str: String = row.get(1)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok((symbol, DailyObservation::new(date, row.get(2)?, row.get(3)?)))
            })
            .map_err(query_err)?;

        let mut observations = 0;
        for row in rows {
            let (symbol, obs) = row.map_err(query_err)?;
            // rows without a parent stock are orphans from older files
            match portfolio.find_mut(&symbol) {
                Some(holding) => {
                    holding.add_observation(obs);
                    observations += 1;
                }
                None => tracing::warn!(symbol = %symbol, "ignoring daily data for unknown stock"),
            }
        }

        tracing::debug!(stocks = portfolio.len(), observations, "loaded portfolio");
        Ok(portfolio)
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute_batch("DELETE FROM daily_data; DELETE FROM stocks;")
            .map_err(query_err)?;

        let mut observations = 0;
        for holding in portfolio.holdings_sorted() {
            tx.execute(
                "INSERT INTO stocks (symbol, name, shares) VALUES (?1, ?2, ?3)",
                params![holding.symbol(), holding.name(), holding.shares()],
            )
            .map_err(query_err)?;

            for obs in holding.observations().iter() {
                tx.execute(
                    "INSERT INTO daily_data (symbol, date, price, volume) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        holding.symbol(),
                        obs.date.format("%Y-%m-%d").to_string(),
                        obs.close,
                        obs.volume
                    ],
                )
                .map_err(query_err)?;
                observations += 1;
            }
        }

        tx.commit().map_err(query_err)?;
        tracing::debug!(stocks = portfolio.len(), observations, "saved portfolio");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new();
        portfolio.add_holding("AAPL", "Apple Inc.", 10.0).unwrap();
        portfolio.add_holding("MSFT", "Microsoft", 2.5).unwrap();
        portfolio
            .ingest_from_source(
                "AAPL",
                vec![
                    DailyObservation::new(date(2), 100.0, 1000.0),
                    DailyObservation::new(date(3), 110.0, 1200.0),
                ],
            )
            .unwrap();
        portfolio
    }

    #[test]
    fn load_empty_database() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let portfolio = adapter.load().unwrap();
        assert!(portfolio.is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let portfolio = sample_portfolio();

        adapter.save(&portfolio).unwrap();
        let loaded = adapter.load().unwrap();

        assert_eq!(loaded, portfolio);
    }

    #[test]
    fn save_replaces_previous_state() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let mut portfolio = sample_portfolio();
        adapter.save(&portfolio).unwrap();

        portfolio.remove_holding("AAPL").unwrap();
        adapter.save(&portfolio).unwrap();

        let loaded = adapter.load().unwrap();
        assert_eq!(loaded.sorted_symbols(), vec!["MSFT"]);
        let conn = adapter.conn().unwrap();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn load_ignores_orphan_daily_data() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.save(&sample_portfolio()).unwrap();
        adapter
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO daily_data (symbol, date, price, volume) VALUES ('TSLA', '2024-01-02', 250.0, 10.0)",
                [],
            )
            .unwrap();

        let loaded = adapter.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.find("TSLA").is_none());
    }

    #[test]
    fn load_rejects_bad_date() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.save(&sample_portfolio()).unwrap();
        adapter
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO daily_data (symbol, date, price, volume) VALUES ('AAPL', '1/4/24', 1.0, 1.0)",
                [],
            )
            .unwrap();

        let err = adapter.load().unwrap_err();
        assert!(matches!(err, PortfolioError::DatabaseQuery { .. }));
    }

    #[test]
    fn load_rejects_negative_shares() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.save(&sample_portfolio()).unwrap();
        adapter
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO stocks (symbol, name, shares) VALUES ('TSLA', 'Tesla', -5.0)",
                [],
            )
            .unwrap();

        let err = adapter.load().unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput { ref field, .. } if field == "shares"));
    }

    #[test]
    fn open_file_persists_across_adapters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stocks.db");

        SqliteAdapter::open(&path, 1)
            .unwrap()
            .save(&sample_portfolio())
            .unwrap();
        let loaded = SqliteAdapter::open(&path, 1).unwrap().load().unwrap();

        assert_eq!(loaded.sorted_symbols(), vec!["AAPL", "MSFT"]);
        assert_eq!(loaded.find("AAPL").unwrap().observations().len(), 2);
    }
}
