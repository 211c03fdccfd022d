//! Error types for the smoothcast library.

use thiserror::Error;

/// Result type alias for smoothing and diagnostic operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while preparing data, fitting models or searching grids.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Input file could not be read or parsed.
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Study configuration is malformed or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::DataLoad(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 24, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24, got 5"
        );

        let err = ForecastError::InvalidParameter("grid must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid parameter: grid must not be empty");

        let err = ForecastError::DimensionMismatch {
            expected: 48,
            got: 12,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 48, got 12");

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");

        let err = ForecastError::Config("seasonal_period must be >= 2".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: seasonal_period must be >= 2"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::DataLoad("missing column".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn toml_errors_become_config_errors() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("period = = 12");
        let err: ForecastError = parsed.unwrap_err().into();
        assert!(matches!(err, ForecastError::Config(_)));
    }
}
