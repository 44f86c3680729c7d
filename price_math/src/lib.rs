//! # Price Math
//!
//! Numerical building blocks used by the property price models.
//! This crate provides the pieces the SARIMA fitter and the unit-root test
//! are assembled from:
//! - Lag polynomial algebra (seasonal expansion, differencing, psi weights)
//! - Ordinary least squares with coefficient standard errors
//! - Nelder-Mead simplex minimisation
//! - Normal distribution helpers
//! - Sample ACF and PACF (Durbin-Levinson)
//! - Descriptive statistics

use thiserror::Error;

pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod optimization;
pub mod polynomial;
pub mod regression;

pub use correlation::{acf, pacf};
pub use descriptive::{mean, median, sample_std_dev, std_dev};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use polynomial::LagPolynomial;
pub use regression::{ols, OlsFit};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
