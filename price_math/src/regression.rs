//! Ordinary least squares on a dense design matrix

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Fitted least squares regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// t-ratio of coefficient `index`
    pub fn t_value(&self, index: usize) -> Result<f64> {
        let coef = self.coefficients.get(index).ok_or_else(|| {
            MathError::InvalidInput(format!("No coefficient at index {}", index))
        })?;
        let se = self.std_errors[index];
        if se <= 0.0 || !se.is_finite() {
            return Err(MathError::CalculationError(
                "Standard error is zero or undefined".to_string(),
            ));
        }

        Ok(coef / se)
    }

    /// Gaussian log-likelihood at the OLS estimate
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting one parameter per coefficient
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit `y = X b + e` by solving the normal equations
///
/// `design` holds one row per observation; include a column of ones for an
/// intercept.
pub fn ols(design: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let n = y.len();
    if design.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            design.len(),
            n
        )));
    }

    let k = design.first().map(|row| row.len()).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "OLS with {} regressors needs more than {} observations, have {}",
            k, k, n
        )));
    }
    if design.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design rows have inconsistent widths".to_string(),
        ));
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in design.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let inverse = invert(&xtx)?;
    let coefficients: Vec<f64> = (0..k)
        .map(|i| (0..k).map(|j| inverse[i][j] * xty[j]).sum())
        .collect();

    let ssr: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (target - fitted).powi(2)
        })
        .sum();

    let sigma_sq = ssr / (n - k) as f64;
    let std_errors = (0..k)
        .map(|i| (sigma_sq * inverse[i][i]).max(0.0).sqrt())
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Gauss-Jordan inversion with partial pivoting
fn invert(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let k = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot][col].abs() <= 1e-12 * scale {
            return Err(MathError::CalculationError(
                "Design matrix is singular".to_string(),
            ));
        }

        a.swap(col, pivot);
        inv.swap(col, pivot);

        let p = a[col][col];
        for j in 0..k {
            a[col][j] /= p;
            inv[col][j] /= p;
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_exact_line() {
        let design: Vec<Vec<f64>> = (0..6).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..6).map(|i| 3.0 + 2.0 * i as f64).collect();

        let fit = ols(&design, &y).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.ssr, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_standard_errors_simple_regression() {
        // y = [1, 3, 2, 5, 4], x = [0..5]
        let design: Vec<Vec<f64>> = (0..5).map(|i| vec![1.0, i as f64]).collect();
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];

        let fit = ols(&design, &y).unwrap();
        // slope = 0.8, intercept = 1.4, ssr = 3.6, se(slope) = sqrt(1.2 / 10)
        assert_abs_diff_eq!(fit.coefficients[1], 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[0], 1.4, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.ssr, 3.6, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.std_errors[1], (0.12f64).sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(
            fit.t_value(1).unwrap(),
            0.8 / (0.12f64).sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_singular_design() {
        let design: Vec<Vec<f64>> = (0..5).map(|_| vec![1.0, 2.0]).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(matches!(
            ols(&design, &y),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_too_few_rows() {
        let design = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            ols(&design, &[1.0, 2.0]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
