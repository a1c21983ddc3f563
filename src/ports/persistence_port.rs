//! Persistence port trait.

use crate::domain::error::PortfolioError;
use crate::domain::portfolio::Portfolio;

/// Whole-portfolio storage. Both operations are all-or-nothing.
pub trait PersistencePort {
    /// Read the full stored state. On error the caller keeps its current state.
    fn load(&self) -> Result<Portfolio, PortfolioError>;

    /// Durably replace the stored state with `portfolio`.
    fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError>;
}
