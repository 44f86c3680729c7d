//! Residual diagnostics for fitted models

use crate::error::Result;
use crate::fitter::ModelHandle;
use price_math::descriptive::min_max;
use price_math::{mean, std_dev};
use serde::Serialize;
use std::fmt;

/// Fit statistics and residual summary of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    pub aic: f64,
    pub bic: f64,
    pub log_likelihood: f64,
    pub residual_mean: f64,
    pub residual_std: f64,
    pub residual_min: f64,
    pub residual_max: f64,
}

impl fmt::Display for ModelDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AIC: {:.2}", self.aic)?;
        writeln!(f, "BIC: {:.2}", self.bic)?;
        writeln!(f, "Log-likelihood: {:.2}", self.log_likelihood)?;
        writeln!(f, "Residual mean: {:.4}", self.residual_mean)?;
        writeln!(f, "Residual std: {:.4}", self.residual_std)?;
        write!(
            f,
            "Residual range: [{:.4}, {:.4}]",
            self.residual_min, self.residual_max
        )
    }
}

/// Summarise a fitted model
pub fn diagnose<H: ModelHandle + ?Sized>(handle: &H) -> Result<ModelDiagnostics> {
    let residuals = handle.residuals();
    let (residual_min, residual_max) = min_max(residuals)?;

    Ok(ModelDiagnostics {
        aic: handle.aic(),
        bic: handle.bic(),
        log_likelihood: handle.log_likelihood(),
        residual_mean: mean(residuals)?,
        residual_std: std_dev(residuals)?,
        residual_min,
        residual_max,
    })
}
