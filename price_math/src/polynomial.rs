//! Lag operator polynomials
//!
//! A polynomial `1 + c1 B + c2 B^2 + ...` in the backshift operator `B`.
//! Seasonal SARIMA operators are built by multiplying a regular polynomial
//! with one in `B^s`, and the differencing operator `(1 - B)^d (1 - B^s)^D`
//! is folded into the autoregressive side for forecasting.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Polynomial in the backshift operator, coefficient `k` multiplies `B^k`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagPolynomial {
    coefficients: Vec<f64>,
}

impl LagPolynomial {
    /// Create a polynomial from raw coefficients (index 0 is the constant)
    pub fn new(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(MathError::InvalidInput(
                "A lag polynomial needs at least a constant term".to_string(),
            ));
        }

        Ok(Self { coefficients })
    }

    /// The identity polynomial `1`
    pub fn one() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// Autoregressive form `1 - phi_1 B^step - phi_2 B^(2 step) - ...`
    pub fn autoregressive(phi: &[f64], step: usize) -> Self {
        Self::sparse(phi, step, -1.0)
    }

    /// Moving-average form `1 + theta_1 B^step + theta_2 B^(2 step) + ...`
    pub fn moving_average(theta: &[f64], step: usize) -> Self {
        Self::sparse(theta, step, 1.0)
    }

    fn sparse(params: &[f64], step: usize, sign: f64) -> Self {
        if params.is_empty() || step == 0 {
            return Self::one();
        }

        let mut coefficients = vec![0.0; params.len() * step + 1];
        coefficients[0] = 1.0;
        for (i, &p) in params.iter().enumerate() {
            coefficients[(i + 1) * step] = sign * p;
        }

        Self { coefficients }
    }

    /// Differencing operator `(1 - B)^d (1 - B^s)^seasonal_d`
    pub fn differencing(d: usize, seasonal_d: usize, period: usize) -> Self {
        let mut result = Self::one();
        let first = Self::autoregressive(&[1.0], 1);
        for _ in 0..d {
            result = result.multiply(&first);
        }

        if period > 0 {
            let seasonal = Self::autoregressive(&[1.0], period);
            for _ in 0..seasonal_d {
                result = result.multiply(&seasonal);
            }
        }

        result
    }

    /// Product of two polynomials
    pub fn multiply(&self, other: &Self) -> Self {
        let mut coefficients = vec![0.0; self.degree() + other.degree() + 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }

        Self { coefficients }
    }

    /// Highest power of `B`
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Raw coefficients, constant first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of `B^k`, zero beyond the degree
    pub fn coefficient(&self, k: usize) -> f64 {
        self.coefficients.get(k).copied().unwrap_or(0.0)
    }

    /// Apply the operator to a series, dropping the first `degree` values
    ///
    /// Element `t` of the output is `sum_k c_k * y[t + degree - k]`.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>> {
        let degree = self.degree();
        if values.len() <= degree {
            return Err(MathError::InsufficientData(format!(
                "Operator of degree {} needs more than {} values, have {}",
                degree,
                degree,
                values.len()
            )));
        }

        Ok((degree..values.len())
            .map(|t| {
                self.coefficients
                    .iter()
                    .enumerate()
                    .map(|(k, &c)| c * values[t - k])
                    .sum()
            })
            .collect())
    }

    /// Psi weights of `ma(B) / ar(B)` up to (but excluding) `count`
    ///
    /// These are the coefficients of the infinite moving-average
    /// representation and drive the h-step forecast variance.
    pub fn psi_weights(ar: &Self, ma: &Self, count: usize) -> Vec<f64> {
        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }

            let mut value = ma.coefficient(j);
            for i in 1..=j.min(ar.degree()) {
                value -= ar.coefficient(i) * psi[j - i];
            }
            psi.push(value);
        }

        psi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_seasonal_expansion() {
        // (1 - 0.5B)(1 - 0.3B^4) = 1 - 0.5B - 0.3B^4 + 0.15B^5
        let regular = LagPolynomial::autoregressive(&[0.5], 1);
        let seasonal = LagPolynomial::autoregressive(&[0.3], 4);
        let product = regular.multiply(&seasonal);

        assert_eq!(product.degree(), 5);
        assert_abs_diff_eq!(product.coefficient(1), -0.5);
        assert_abs_diff_eq!(product.coefficient(4), -0.3);
        assert_abs_diff_eq!(product.coefficient(5), 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(product.coefficient(2), 0.0);
    }

    #[test]
    fn test_differencing_operator() {
        let op = LagPolynomial::differencing(1, 1, 4);
        // (1 - B)(1 - B^4) = 1 - B - B^4 + B^5
        assert_eq!(op.coefficients(), &[1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);

        let values: Vec<f64> = (0..10).map(|i| (i * i) as f64).collect();
        let diffed = op.apply(&values).unwrap();
        assert_eq!(diffed.len(), 5);
        // second differences of i^2 at lags 1 and 4 are constant: 2 * 4 = 8
        for v in diffed {
            assert_abs_diff_eq!(v, 8.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_apply_too_short() {
        let op = LagPolynomial::differencing(0, 1, 12);
        assert!(op.apply(&[1.0; 12]).is_err());
    }

    #[test]
    fn test_psi_weights_random_walk() {
        // (1 - B) y = e  =>  psi_j = 1 for all j
        let ar = LagPolynomial::differencing(1, 0, 0);
        let psi = LagPolynomial::psi_weights(&ar, &LagPolynomial::one(), 5);
        assert_eq!(psi, vec![1.0; 5]);
    }

    #[test]
    fn test_psi_weights_ar1() {
        let ar = LagPolynomial::autoregressive(&[0.5], 1);
        let psi = LagPolynomial::psi_weights(&ar, &LagPolynomial::one(), 4);
        assert_abs_diff_eq!(psi[3], 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_polynomial_rejected() {
        assert!(LagPolynomial::new(vec![]).is_err());
        assert_eq!(LagPolynomial::moving_average(&[], 12), LagPolynomial::one());
    }
}
