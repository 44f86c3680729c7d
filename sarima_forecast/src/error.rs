//! Error types for the sarima_forecast crate

use thiserror::Error;

/// Failure of a single model fit
///
/// Recovered by the search engine and recorded against the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FitError {
    pub message: String,
}

impl FitError {
    /// Create a fit error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Custom error types for the sarima_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The input had no rows or values
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The input is too short for the requested computation
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Error related to data processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A series or result violated its invariants
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(String),

    /// A model could not be fitted
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from loading transaction data
    #[error("Source data error: {0}")]
    Source(#[from] property_data::DataError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<price_math::MathError> for ForecastError {
    fn from(err: price_math::MathError) -> Self {
        ForecastError::MathError(err.to_string())
    }
}
