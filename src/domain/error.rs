//! Domain error types.

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("stock {symbol} already exists")]
    DuplicateSymbol { symbol: String },

    #[error("{symbol} is not in the portfolio")]
    NotFound { symbol: String },

    #[error("share quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: f64 },

    #[error("cannot sell {requested} shares of {symbol}: only {available} held")]
    InsufficientShares {
        symbol: String,
        requested: f64,
        available: f64,
    },

    #[error("no historical data for {symbol}")]
    EmptySeries { symbol: String },

    #[error("profit/loss percent for {symbol} is undefined on a zero cost basis")]
    DivisionByZero { symbol: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("import error in {path}: {reason}")]
    Import { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortfolioError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        PortfolioError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&PortfolioError> for std::process::ExitCode {
    fn from(err: &PortfolioError) -> Self {
        let code: u8 = match err {
            PortfolioError::Io(_) | PortfolioError::Import { .. } => 1,
            PortfolioError::ConfigParse { .. } | PortfolioError::ConfigInvalid { .. } => 2,
            PortfolioError::Database { .. } | PortfolioError::DatabaseQuery { .. } => 3,
            PortfolioError::InvalidInput { .. }
            | PortfolioError::DuplicateSymbol { .. }
            | PortfolioError::InvalidQuantity { .. }
            | PortfolioError::InsufficientShares { .. } => 4,
            PortfolioError::NotFound { .. }
            | PortfolioError::EmptySeries { .. }
            | PortfolioError::DivisionByZero { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
