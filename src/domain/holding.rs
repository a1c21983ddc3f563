//! A tracked symbol: share count, price history, and accounting.

use super::error::PortfolioError;
use super::observation::DailyObservation;
use super::series::ObservationSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    symbol: String,
    name: String,
    shares: f64,
    observations: ObservationSeries,
}

impl Holding {
    /// Symbols are stored upper-case. Callers validate `symbol` and `shares`;
    /// see [`Portfolio::add_holding`](super::portfolio::Portfolio::add_holding).
    pub fn new(symbol: &str, name: &str, shares: f64) -> Self {
        let symbol = symbol.trim().to_uppercase();
        Holding {
            observations: ObservationSeries::new(symbol.clone()),
            symbol,
            name: name.trim().to_string(),
            shares,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shares(&self) -> f64 {
        self.shares
    }

    pub fn observations(&self) -> &ObservationSeries {
        &self.observations
    }

    pub fn buy(&mut self, quantity: f64) -> Result<(), PortfolioError> {
        check_quantity(quantity)?;
        self.shares += quantity;
        Ok(())
    }

    pub fn sell(&mut self, quantity: f64) -> Result<(), PortfolioError> {
        check_quantity(quantity)?;
        if quantity > self.shares {
            return Err(PortfolioError::InsufficientShares {
                symbol: self.symbol.clone(),
                requested: quantity,
                available: self.shares,
            });
        }
        self.shares -= quantity;
        Ok(())
    }

    pub fn add_observation(&mut self, observation: DailyObservation) -> Option<DailyObservation> {
        self.observations.insert(observation)
    }

    pub fn add_observations<I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = DailyObservation>,
    {
        self.observations.bulk_ingest(observations)
    }

    /// Paper gain on the current share count between the oldest and newest
    /// recorded closes.
    pub fn profit_loss(&self) -> Result<f64, PortfolioError> {
        let earliest = self.observations.earliest()?;
        let latest = self.observations.latest()?;
        Ok(latest.close * self.shares - earliest.close * self.shares)
    }

    pub fn profit_loss_percent(&self) -> Result<f64, PortfolioError> {
        let profit_loss = self.profit_loss()?;
        let cost_basis = self.observations.earliest()?.close * self.shares;
        if cost_basis == 0.0 {
            return Err(PortfolioError::DivisionByZero {
                symbol: self.symbol.clone(),
            });
        }
        Ok(profit_loss / cost_basis * 100.0)
    }

    /// Latest close times current shares.
    pub fn market_value(&self) -> Result<f64, PortfolioError> {
        Ok(self.observations.latest()?.close * self.shares)
    }
}

fn check_quantity(quantity: f64) -> Result<(), PortfolioError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(PortfolioError::InvalidQuantity { quantity });
    }
    Ok(())
}
