//! Augmented Dickey-Fuller unit-root test
//!
//! The regression includes a constant and no trend:
//!
//! ```text
//! dy[t] = a + b * y[t-1] + g1 * dy[t-1] + ... + gk * dy[t-k] + e[t]
//! ```
//!
//! The lag `k` is picked by AIC over a shared sample, the statistic is the
//! t-ratio of `b` and p-values follow MacKinnon's response surfaces.

use crate::error::{ForecastError, Result};
use crate::series::{Frequency, TimeSeries};
use price_math::distribution::normal_cdf;
use price_math::{acf, ols, pacf, OlsFit};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Shortest series the test accepts
pub const MIN_OBSERVATIONS: usize = 4;

/// Default significance level for the stationarity verdict
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

// MacKinnon (1994) p-value surface, constant-only regression
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) critical value surfaces, constant-only regression
const CRITICAL_SURFACES: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.04]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Outcome of one ADF test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityReport {
    /// Whether the unit root is rejected at the checker's significance
    pub is_stationary: bool,
    /// ADF t-statistic
    pub statistic: f64,
    /// Approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub n_obs: usize,
    /// Critical values keyed by "1%", "5%" and "10%"
    pub critical_values: BTreeMap<String, f64>,
}

impl fmt::Display for StationarityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ADF Statistic: {:.6}", self.statistic)?;
        writeln!(f, "p-value: {:.6}", self.p_value)?;
        writeln!(f, "Lags used: {}, observations: {}", self.used_lag, self.n_obs)?;
        for (level, value) in &self.critical_values {
            writeln!(f, "Critical Value ({}): {:.3}", level, value)?;
        }
        write!(
            f,
            "Series is {}",
            if self.is_stationary {
                "stationary"
            } else {
                "non-stationary"
            }
        )
    }
}

/// Suggested differencing for a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferencingRecommendation {
    /// Test on the series itself
    pub original: StationarityReport,
    /// Test on the first difference
    pub first_difference: StationarityReport,
    /// Regular differencing order
    pub d: usize,
    /// Seasonal differencing order
    pub seasonal_d: usize,
    /// Seasonal period for the series' frequency
    pub seasonal_period: usize,
}

/// Order ranges worth searching once differencing is settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedRanges {
    pub p: Vec<usize>,
    pub q: Vec<usize>,
    pub seasonal_p: Vec<usize>,
    pub seasonal_q: Vec<usize>,
}

impl Default for SuggestedRanges {
    fn default() -> Self {
        Self {
            p: vec![0, 1, 2],
            q: vec![0, 1, 2],
            seasonal_p: vec![0, 1],
            seasonal_q: vec![0, 1],
        }
    }
}

/// Differencing advice plus the correlograms of the first difference
///
/// A PACF that cuts off after lag `p` points at AR(p), an ACF that cuts off
/// after lag `q` at MA(q). The same reading at multiples of the seasonal
/// period guides `P` and `Q`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterGuide {
    pub differencing: DifferencingRecommendation,
    /// Autocorrelations of the first difference, lags `0..=lags`
    pub acf: Vec<f64>,
    /// Partial autocorrelations of the first difference, lags `0..=lags`
    pub pacf: Vec<f64>,
    /// Length of the first difference
    pub n_obs: usize,
    pub suggested_ranges: SuggestedRanges,
}

impl ParameterGuide {
    /// Highest lag in the correlograms
    pub fn lags(&self) -> usize {
        self.acf.len().saturating_sub(1)
    }

    /// Approximate 95% band for a white-noise correlogram
    pub fn confidence_band(&self) -> f64 {
        1.96 / (self.n_obs as f64).sqrt()
    }
}

impl fmt::Display for ParameterGuide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.differencing;
        writeln!(
            f,
            "d = {}, D = {}, s = {}",
            d.d, d.seasonal_d, d.seasonal_period
        )?;
        let shown = self.lags().min(4);
        let head = |values: &[f64]| {
            values[1..=shown]
                .iter()
                .map(|v| format!("{:.3}", v))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "ACF lags 1-{}: {}", shown, head(&self.acf))?;
        writeln!(f, "PACF lags 1-{}: {}", shown, head(&self.pacf))?;
        let r = &self.suggested_ranges;
        write!(
            f,
            "Suggested ranges: p {:?}, q {:?}, P {:?}, Q {:?}",
            r.p, r.q, r.seasonal_p, r.seasonal_q
        )
    }
}

/// Correlogram depth: up to a year of weekly lags, 20 otherwise, and never
/// more than a third of the differenced series
pub fn correlogram_lags(frequency: Frequency, diff_len: usize) -> usize {
    let base = match frequency {
        Frequency::Weekly => 52,
        _ => 20,
    };
    base.min(diff_len / 3)
}

/// Runs ADF tests at a fixed significance level
#[derive(Debug, Clone, Copy)]
pub struct StationarityChecker {
    significance: f64,
}

impl Default for StationarityChecker {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

impl StationarityChecker {
    /// Create a checker using the 5% level
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checker with a custom significance level
    pub fn with_significance(significance: f64) -> Result<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Significance must be between 0 and 1, got {}",
                significance
            )));
        }

        Ok(Self { significance })
    }

    /// Significance level used for the verdict
    pub fn significance(&self) -> f64 {
        self.significance
    }

    /// Test a series for a unit root
    pub fn check(&self, series: &TimeSeries) -> Result<StationarityReport> {
        self.check_values(series.values())
    }

    /// Test raw values for a unit root
    pub fn check_values(&self, values: &[f64]) -> Result<StationarityReport> {
        let n = values.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: n,
            });
        }

        let max_lag = max_lag(n);
        let used_lag = select_lag(values, max_lag)?;
        let fit = adf_regression(values, used_lag, used_lag)?;
        let statistic = fit.t_value(1)?;
        let p_value = mackinnon_p_value(statistic)?;

        let critical_values = critical_values(fit.nobs);
        let report = StationarityReport {
            is_stationary: p_value <= self.significance,
            statistic,
            p_value,
            used_lag,
            n_obs: fit.nobs,
            critical_values,
        };

        info!(
            statistic = report.statistic,
            p_value = report.p_value,
            used_lag,
            stationary = report.is_stationary,
            "ADF test"
        );
        Ok(report)
    }

    /// Recommend a differencing order
    ///
    /// `d` is 1 only when the series is non-stationary and its first
    /// difference is stationary. One seasonal difference is always
    /// suggested at the frequency's default period.
    pub fn recommend(&self, series: &TimeSeries) -> Result<DifferencingRecommendation> {
        let original = self.check(series)?;
        let first_difference = self.check_values(&series.first_difference())?;

        let d = usize::from(!original.is_stationary && first_difference.is_stationary);

        Ok(DifferencingRecommendation {
            original,
            first_difference,
            d,
            seasonal_d: 1,
            seasonal_period: series.frequency().default_seasonal_period(),
        })
    }

    /// Differencing advice together with ACF and PACF of the first difference
    pub fn analyze_parameters(&self, series: &TimeSeries) -> Result<ParameterGuide> {
        let differencing = self.recommend(series)?;
        let diff = series.first_difference();
        let lags = correlogram_lags(series.frequency(), diff.len());
        if lags == 0 {
            return Err(ForecastError::InsufficientData {
                needed: 3,
                got: diff.len(),
            });
        }

        let guide = ParameterGuide {
            differencing,
            acf: acf(&diff, lags)?,
            pacf: pacf(&diff, lags)?,
            n_obs: diff.len(),
            suggested_ranges: SuggestedRanges::default(),
        };
        debug!(lags, "computed correlograms");
        Ok(guide)
    }
}

/// `min(ceil(12 * (n / 100)^(1/4)), n / 2 - 2)`
fn max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((n / 2).saturating_sub(2))
}

/// Regress `dy[t]` on a constant, `y[t-1]` and `lag` lagged differences
///
/// Rows start after `start_lag` differences so that several lags can be
/// compared on the same sample.
fn adf_regression(values: &[f64], lag: usize, start_lag: usize) -> Result<OlsFit> {
    let n = values.len();
    let first = start_lag + 1;

    let mut design = Vec::with_capacity(n.saturating_sub(first));
    let mut response = Vec::with_capacity(n.saturating_sub(first));
    for t in first..n {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(values[t - 1]);
        for i in 1..=lag {
            row.push(values[t - i] - values[t - i - 1]);
        }
        design.push(row);
        response.push(values[t] - values[t - 1]);
    }

    Ok(ols(&design, &response)?)
}

/// Lag with the lowest AIC on the sample shared by all lags up to `max_lag`
fn select_lag(values: &[f64], max_lag: usize) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    let mut last_error = None;

    for lag in 0..=max_lag {
        match adf_regression(values, lag, max_lag) {
            Ok(fit) => {
                let aic = fit.aic();
                debug!(lag, aic, "ADF lag candidate");
                if aic.is_finite() && best.map_or(true, |(_, b)| aic < b) {
                    best = Some((lag, aic));
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    match (best, last_error) {
        (Some((lag, _)), _) => Ok(lag),
        (None, Some(e)) => Err(e),
        (None, None) => Err(ForecastError::MathError(
            "No ADF regression could be estimated".to_string(),
        )),
    }
}

/// MacKinnon (1994) approximate p-value of an ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic.is_nan() {
        return Err(ForecastError::MathError(
            "ADF statistic is not a number".to_string(),
        ));
    }
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);

    Ok(normal_cdf(z)?)
}

/// MacKinnon (2010) critical values for a regression with `nobs` rows
pub fn critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let t = nobs as f64;
    CRITICAL_SURFACES
        .iter()
        .map(|(level, b)| {
            let value = b[0] + b[1] / t + b[2] / t.powi(2) + b[3] / t.powi(3);
            (level.to_string(), value)
        })
        .collect()
}
