#![allow(dead_code)]

use chrono::NaiveDate;
use stockfolio::domain::error::PortfolioError;
pub use stockfolio::domain::observation::DailyObservation;
use stockfolio::domain::portfolio::Portfolio;
use stockfolio::ports::persistence_port::PersistencePort;
use std::cell::{Cell, RefCell};

/// In-memory store that records how often it was saved.
pub struct MemoryStore {
    pub state: RefCell<Portfolio>,
    pub saves: Cell<usize>,
    pub fail_save: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(Portfolio::new()),
            saves: Cell::new(0),
            fail_save: false,
        }
    }

    pub fn with_portfolio(portfolio: Portfolio) -> Self {
        Self {
            state: RefCell::new(portfolio),
            saves: Cell::new(0),
            fail_save: false,
        }
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_save = true;
        self
    }
}

impl PersistencePort for MemoryStore {
    fn load(&self) -> Result<Portfolio, PortfolioError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError> {
        if self.fail_save {
            return Err(PortfolioError::Database {
                reason: "disk full".into(),
            });
        }
        *self.state.borrow_mut() = portfolio.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn obs(date_str: &str, close: f64, volume: f64) -> DailyObservation {
    DailyObservation::new(
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        close,
        volume,
    )
}

/// AAPL (10 shares) with two closes, MSFT with no history.
pub fn sample_portfolio() -> Portfolio {
    let mut portfolio = Portfolio::new();
    portfolio.add_holding("AAPL", "Apple Inc.", 10.0).unwrap();
    portfolio.add_holding("MSFT", "Microsoft", 5.0).unwrap();
    portfolio
        .ingest_from_source(
            "AAPL",
            vec![obs("2024-01-02", 100.0, 1000.0), obs("2024-01-03", 110.0, 1200.0)],
        )
        .unwrap();
    portfolio
}

pub fn generate_observations(start_date: &str, count: usize, start_price: f64) -> Vec<DailyObservation> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            DailyObservation::new(
                start + chrono::Duration::days(i as i64),
                start_price + i as f64,
                1000.0,
            )
        })
        .collect()
}
