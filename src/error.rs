//! Error types for valuation and market data access

use thiserror::Error;

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Failure of a valuation operation
///
/// The engine never returns a partially computed result: any of these means
/// no valuation was produced.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// A precondition on the numeric inputs failed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The market data provider could not supply a snapshot
    #[error("Market data provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Arithmetic could not be carried out (e.g. non-positive Gordon denominator)
    #[error("Computation error: {0}")]
    Computation(String),
}

impl ValuationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ValuationError::InvalidInput(message.into())
    }
}

/// Failure of the external market data collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider has no record for the ticker
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Provider could not be reached or refused the request
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Provider answered with a record that cannot be used
    #[error("Malformed response for {ticker}: {reason}")]
    Malformed { ticker: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure to load model parameters
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_wraps_into_valuation_error() {
        let err: ValuationError = ProviderError::UnknownTicker("ZZZZ".to_string()).into();
        assert!(matches!(err, ValuationError::Provider(ProviderError::UnknownTicker(_))));
        assert_eq!(err.to_string(), "Market data provider error: Unknown ticker: ZZZZ");
    }

    #[test]
    fn test_invalid_input_message_names_precondition() {
        let err = ValuationError::invalid("shares outstanding must be positive");
        assert_eq!(err.to_string(), "Invalid input: shares outstanding must be positive");
    }
}
