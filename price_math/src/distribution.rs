//! Standard normal helpers used for p-values and forecast intervals

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| MathError::Distribution(e.to_string()))
}

/// Cumulative distribution function of the standard normal
pub fn normal_cdf(x: f64) -> Result<f64> {
    Ok(standard_normal()?.cdf(x))
}

/// Quantile (inverse CDF) of the standard normal
pub fn normal_quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Probability must lie strictly between 0 and 1, got {}",
            p
        )));
    }

    Ok(standard_normal()?.inverse_cdf(p))
}

/// Two-sided critical value for a confidence level, e.g. 1.96 for 0.95
pub fn two_sided_z(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }

    normal_quantile(0.5 + confidence_level / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_sided_z_common_levels() {
        assert_abs_diff_eq!(two_sided_z(0.95).unwrap(), 1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(two_sided_z(0.90).unwrap(), 1.644854, epsilon = 1e-5);
        assert_abs_diff_eq!(two_sided_z(0.99).unwrap(), 2.575829, epsilon = 1e-5);
    }

    #[test]
    fn test_cdf_symmetry() {
        assert_abs_diff_eq!(normal_cdf(0.0).unwrap(), 0.5, epsilon = 1e-12);
        let a = normal_cdf(1.3).unwrap();
        let b = normal_cdf(-1.3).unwrap();
        assert_abs_diff_eq!(a + b, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_levels() {
        assert!(two_sided_z(0.0).is_err());
        assert!(two_sided_z(1.0).is_err());
        assert!(normal_quantile(f64::NAN).is_err());
    }
}
