//! Sample autocorrelation and partial autocorrelation

use crate::descriptive::mean;
use crate::{MathError, Result};

/// Sample autocorrelations for lags `0..=nlags`
///
/// Uses the biased estimator: every lag is scaled by the full-sample sum of
/// squares, so `acf[0]` is always 1.
pub fn acf(values: &[f64], nlags: usize) -> Result<Vec<f64>> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Autocorrelation needs at least 2 values, have {}",
            values.len()
        )));
    }
    if nlags >= values.len() {
        return Err(MathError::InvalidInput(format!(
            "Lag {} is not below the series length {}",
            nlags,
            values.len()
        )));
    }

    let m = mean(values)?;
    let centered: Vec<f64> = values.iter().map(|v| v - m).collect();
    let denom: f64 = centered.iter().map(|v| v * v).sum();
    if denom == 0.0 || !denom.is_finite() {
        return Err(MathError::CalculationError(
            "Autocorrelation is undefined for a constant series".to_string(),
        ));
    }

    Ok((0..=nlags)
        .map(|k| {
            let num: f64 = centered[k..]
                .iter()
                .zip(&centered)
                .map(|(a, b)| a * b)
                .sum();
            num / denom
        })
        .collect())
}

/// Partial autocorrelations from autocorrelations via Durbin-Levinson
///
/// `rho[0]` must be 1. The result has the same length with `pacf[0] = 1`.
pub fn durbin_levinson(rho: &[f64]) -> Result<Vec<f64>> {
    let mut pacf = Vec::with_capacity(rho.len());
    if rho.is_empty() {
        return Ok(pacf);
    }
    pacf.push(1.0);

    // phi[j - 1] holds phi_{k,j} of the current order k
    let mut phi: Vec<f64> = Vec::with_capacity(rho.len());
    for k in 1..rho.len() {
        let num = rho[k] - (1..k).map(|j| phi[j - 1] * rho[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[j - 1] * rho[j]).sum::<f64>();
        if den.abs() < f64::EPSILON || !den.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Durbin-Levinson recursion is singular at lag {}",
                k
            )));
        }

        let phi_kk = num / den;
        let previous = phi.clone();
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - phi_kk * previous[k - j - 1];
        }
        phi.push(phi_kk);
        pacf.push(phi_kk);
    }

    Ok(pacf)
}

/// Sample partial autocorrelations for lags `0..=nlags`
pub fn pacf(values: &[f64], nlags: usize) -> Result<Vec<f64>> {
    durbin_levinson(&acf(values, nlags)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_acf_by_hand() {
        let r = acf(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(r.len(), 3);
        assert_abs_diff_eq!(r[0], 1.0);
        assert_abs_diff_eq!(r[1], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(r[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_ar1_autocorrelations_give_single_partial() {
        let phi = 0.6f64;
        let rho: Vec<f64> = (0..6).map(|k| phi.powi(k)).collect();
        let p = durbin_levinson(&rho).unwrap();

        assert_abs_diff_eq!(p[0], 1.0);
        assert_abs_diff_eq!(p[1], phi, epsilon = 1e-12);
        for value in &p[2..] {
            assert_abs_diff_eq!(*value, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ar2_partials() {
        // AR(2) with phi1 = 0.5, phi2 = 0.3
        let (a, b) = (0.5f64, 0.3f64);
        let mut rho = vec![1.0, a / (1.0 - b)];
        for k in 2..6 {
            rho.push(a * rho[k - 1] + b * rho[k - 2]);
        }
        let p = durbin_levinson(&rho).unwrap();

        assert_abs_diff_eq!(p[1], rho[1], epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], b, epsilon = 1e-12);
        assert_abs_diff_eq!(p[3], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(acf(&[1.0], 0), Err(MathError::InsufficientData(_))));
        assert!(matches!(acf(&[1.0, 2.0, 3.0], 3), Err(MathError::InvalidInput(_))));
        assert!(matches!(acf(&[4.0; 10], 2), Err(MathError::CalculationError(_))));
        assert!(durbin_levinson(&[1.0, 1.0, 1.0]).is_err());
        assert!(durbin_levinson(&[]).unwrap().is_empty());
    }
}
