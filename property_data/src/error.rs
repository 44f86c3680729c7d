//! Error types for the property_data crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or analysing transaction records
#[derive(Debug, Error)]
pub enum DataError {
    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the csv reader or writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// A field could not be parsed into its typed form
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested dataset file does not exist
    #[error("Dataset file not found: {}", path.display())]
    MissingDataset { path: PathBuf },

    /// No usable rows were left
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A required column is absent from a processed file
    #[error("Schema error: {0}")]
    Schema(String),

    /// Error from a statistics routine
    #[error("Math error: {0}")]
    Math(#[from] price_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DataError>;

impl From<PolarsError> for DataError {
    fn from(err: PolarsError) -> Self {
        DataError::Polars(err.to_string())
    }
}
