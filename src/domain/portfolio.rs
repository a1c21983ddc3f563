//! Portfolio of holdings keyed by upper-cased symbol.

use std::collections::HashMap;

use super::error::PortfolioError;
use super::holding::Holding;
use super::observation::DailyObservation;
use super::report::{HoldingSummary, ReportEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: HashMap<String, Holding>,
}

fn key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn validate_new_holding(symbol: &str, shares: f64) -> Result<(), PortfolioError> {
    if symbol.is_empty() {
        return Err(PortfolioError::invalid_input("symbol", "cannot be blank"));
    }
    if !shares.is_finite() || shares < 0.0 {
        return Err(PortfolioError::invalid_input(
            "shares",
            format!("must be a non-negative number, got {shares}"),
        ));
    }
    Ok(())
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio {
            holdings: HashMap::new(),
        }
    }

    pub fn add_holding(
        &mut self,
        symbol: &str,
        name: &str,
        shares: f64,
    ) -> Result<&Holding, PortfolioError> {
        let key = key(symbol);
        validate_new_holding(&key, shares)?;
        if self.holdings.contains_key(&key) {
            return Err(PortfolioError::DuplicateSymbol { symbol: key });
        }
        let holding = self
            .holdings
            .entry(key.clone())
            .or_insert_with(|| Holding::new(&key, name, shares));
        Ok(&*holding)
    }

    /// Insert a fully-built holding, as a persistence adapter does on load.
    /// Applies the same symbol and share checks as [`Portfolio::add_holding`].
    pub fn insert_holding(&mut self, holding: Holding) -> Result<(), PortfolioError> {
        let key = holding.symbol().to_string();
        validate_new_holding(&key, holding.shares())?;
        if self.holdings.contains_key(&key) {
            return Err(PortfolioError::DuplicateSymbol { symbol: key });
        }
        self.holdings.insert(key, holding);
        Ok(())
    }

    /// Remove a holding together with its observation series.
    pub fn remove_holding(&mut self, symbol: &str) -> Result<Holding, PortfolioError> {
        let key = key(symbol);
        self.holdings
            .remove(&key)
            .ok_or(PortfolioError::NotFound { symbol: key })
    }

    pub fn find(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(&key(symbol))
    }

    pub fn find_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.holdings.get_mut(&key(symbol))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.holdings.contains_key(&key(symbol))
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn buy(&mut self, symbol: &str, quantity: f64) -> Result<f64, PortfolioError> {
        let holding = self.require_mut(symbol)?;
        holding.buy(quantity)?;
        Ok(holding.shares())
    }

    pub fn sell(&mut self, symbol: &str, quantity: f64) -> Result<f64, PortfolioError> {
        let holding = self.require_mut(symbol)?;
        holding.sell(quantity)?;
        Ok(holding.shares())
    }

    pub fn add_observation(
        &mut self,
        symbol: &str,
        observation: DailyObservation,
    ) -> Result<Option<DailyObservation>, PortfolioError> {
        Ok(self.require_mut(symbol)?.add_observation(observation))
    }

    /// Merge observations from any source into a tracked holding.
    /// Returns how many observations were applied.
    pub fn ingest_from_source<I>(
        &mut self,
        symbol: &str,
        observations: I,
    ) -> Result<usize, PortfolioError>
    where
        I: IntoIterator<Item = DailyObservation>,
    {
        let holding = self.require_mut(symbol)?;
        let applied = holding.add_observations(observations);
        tracing::debug!(symbol = %holding.symbol(), applied, "ingested observations");
        Ok(applied)
    }

    /// Symbols in ascending order.
    pub fn sorted_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.holdings.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn holdings_sorted(&self) -> Vec<&Holding> {
        let mut holdings: Vec<&Holding> = self.holdings.values().collect();
        holdings.sort_by(|a, b| a.symbol().cmp(b.symbol()));
        holdings
    }

    /// One entry per holding in symbol order. Holdings without observations
    /// produce a no-data entry instead of failing the report.
    pub fn report(&self) -> Vec<ReportEntry> {
        self.holdings_sorted()
            .into_iter()
            .map(|holding| ReportEntry {
                symbol: holding.symbol().to_string(),
                name: holding.name().to_string(),
                shares: holding.shares(),
                summary: HoldingSummary::compute(holding),
            })
            .collect()
    }

    fn require_mut(&mut self, symbol: &str) -> Result<&mut Holding, PortfolioError> {
        let key = key(symbol);
        match self.holdings.get_mut(&key) {
            Some(holding) => Ok(holding),
            None => Err(PortfolioError::NotFound { symbol: key }),
        }
    }
}
