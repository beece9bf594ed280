//! Error types for portfolio analytics

use thiserror::Error;

/// Errors that can occur while computing portfolio analytics
///
/// Arithmetic edge cases (missing prices, zero variance, non-overlapping
/// dates) are not errors: they surface as missing values in the results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A requested asset identifier has no corresponding data column
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A statistic was requested with fewer observations than it needs
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A value object was constructed from malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The market data source could not supply prices
    #[error("Market data unavailable: {0}")]
    MarketData(String),

    /// A configuration or portfolio document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_yaml::Error> for AnalyticsError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalyticsError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AnalyticsError {
    fn from(err: std::io::Error) -> Self {
        AnalyticsError::Parse(err.to_string())
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
