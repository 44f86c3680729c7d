//! SARIMA estimation by conditional sum of squares
//!
//! The search engine only sees [`ModelFitter`] and [`ModelHandle`]; the
//! [`SarimaFitter`] here is the production implementation.

use crate::config::AnalysisConfig;
use crate::error::{FitError, ForecastError, Result};
use price_math::distribution::two_sided_z;
use price_math::{nelder_mead, LagPolynomial, NelderMeadConfig};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Coefficients are kept inside this interval during estimation
const COEFFICIENT_BOUND: f64 = 0.99;

/// Non-seasonal order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize, usize)", into = "(usize, usize, usize)")]
pub struct Order {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Order {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl From<(usize, usize, usize)> for Order {
    fn from((p, d, q): (usize, usize, usize)) -> Self {
        Self { p, d, q }
    }
}

impl From<Order> for (usize, usize, usize) {
    fn from(order: Order) -> Self {
        (order.p, order.d, order.q)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal order `(P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "(usize, usize, usize, usize)",
    into = "(usize, usize, usize, usize)"
)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// No seasonal component
    pub fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// `(0,1,1,52)` for series longer than 100 points, `(0,1,1,12)` otherwise
    pub fn default_for_len(len: usize) -> Self {
        if len > 100 {
            Self::new(0, 1, 1, 52)
        } else {
            Self::new(0, 1, 1, 12)
        }
    }

    /// Whether any seasonal term or difference is requested
    pub fn is_seasonal(&self) -> bool {
        self.p + self.d + self.q > 0
    }
}

impl From<(usize, usize, usize, usize)> for SeasonalOrder {
    fn from((p, d, q, period): (usize, usize, usize, usize)) -> Self {
        Self { p, d, q, period }
    }
}

impl From<SeasonalOrder> for (usize, usize, usize, usize) {
    fn from(order: SeasonalOrder) -> Self {
        (order.p, order.d, order.q, order.period)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.period)
    }
}

/// Point forecasts with interval bounds, aligned index for index
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBands {
    pub points: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// A fitted model as seen by the search engine
pub trait ModelHandle: fmt::Debug {
    /// Akaike information criterion
    fn aic(&self) -> f64;

    /// Bayesian information criterion
    fn bic(&self) -> f64;

    /// Maximised log-likelihood
    fn log_likelihood(&self) -> f64;

    /// In-sample residuals
    fn residuals(&self) -> &[f64];

    /// Forecast `steps` periods ahead with intervals at `confidence_level`
    fn forecast(&self, steps: usize, confidence_level: f64) -> Result<ForecastBands>;
}

/// Estimation primitive driven by the search engine
pub trait ModelFitter {
    /// The fitted model type
    type Handle: ModelHandle;

    /// Fit `values` with the given orders
    fn fit(
        &self,
        values: &[f64],
        order: Order,
        seasonal: SeasonalOrder,
    ) -> std::result::Result<Self::Handle, FitError>;
}

/// Seasonal ARIMA fitter using conditional sum of squares
#[derive(Debug, Clone, Default)]
pub struct SarimaFitter {
    timeout: Option<Duration>,
    max_iter: Option<usize>,
}

impl SarimaFitter {
    /// Create a fitter with no time limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any fit that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cap the optimiser iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    /// Apply the configured time and iteration limits
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut fitter = Self::new();
        if let Some(secs) = config.fit_timeout_secs {
            fitter = fitter.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max_iter) = config.fit_max_iter {
            fitter = fitter.with_max_iter(max_iter);
        }
        fitter
    }
}

/// Coefficients split by role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarimaParams {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl SarimaParams {
    fn unpack(flat: &[f64], order: Order, seasonal: SeasonalOrder) -> Self {
        let mut rest = flat;
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n.min(rest.len()));
            rest = tail;
            head.to_vec()
        };

        Self {
            ar: take(order.p),
            ma: take(order.q),
            seasonal_ar: take(seasonal.p),
            seasonal_ma: take(seasonal.q),
        }
    }

    fn operators(&self, period: usize) -> (LagPolynomial, LagPolynomial) {
        let ar = LagPolynomial::autoregressive(&self.ar, 1)
            .multiply(&LagPolynomial::autoregressive(&self.seasonal_ar, period));
        let ma = LagPolynomial::moving_average(&self.ma, 1)
            .multiply(&LagPolynomial::moving_average(&self.seasonal_ma, period));
        (ar, ma)
    }
}

/// Residuals of `ar(B) w = ma(B) e`, conditioning on zeros before the
/// first complete AR window. Entries before that window are zero.
fn css_innovations(w: &[f64], ar: &LagPolynomial, ma: &LagPolynomial) -> Vec<f64> {
    let start = ar.degree();
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut value = w[t];
        for i in 1..=ar.degree() {
            value += ar.coefficient(i) * w[t - i];
        }
        for j in 1..=ma.degree().min(t) {
            value -= ma.coefficient(j) * e[t - j];
        }
        e[t] = value;
    }
    e
}

fn sum_of_squares(e: &[f64], start: usize) -> f64 {
    e[start..].iter().map(|v| v * v).sum()
}

impl ModelFitter for SarimaFitter {
    type Handle = SarimaModel;

    fn fit(
        &self,
        values: &[f64],
        order: Order,
        seasonal: SeasonalOrder,
    ) -> std::result::Result<SarimaModel, FitError> {
        if seasonal.is_seasonal() && seasonal.period < 2 {
            return Err(FitError::new(format!(
                "seasonal period must be at least 2, got {}",
                seasonal.period
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FitError::new("series contains non-finite values"));
        }

        let period = if seasonal.is_seasonal() { seasonal.period } else { 0 };
        let differencing = LagPolynomial::differencing(order.d, seasonal.d, period);
        let w = differencing.apply(values).map_err(|e| {
            FitError::new(format!("series too short to difference: {}", e))
        })?;

        let n_params = order.p + order.q + seasonal.p + seasonal.q;
        let ar_lag = order.p + seasonal.p * period;
        if w.len() < ar_lag + n_params + 1 {
            return Err(FitError::new(format!(
                "{} differenced observations cannot support an AR lag of {} with {} parameters",
                w.len(),
                ar_lag,
                n_params
            )));
        }

        let objective = |flat: &[f64]| {
            let params = SarimaParams::unpack(flat, order, seasonal);
            let (ar, ma) = params.operators(period);
            let e = css_innovations(&w, &ar, &ma);
            sum_of_squares(&e, ar.degree())
        };

        let started = Instant::now();
        let mut config = NelderMeadConfig {
            deadline: self.timeout.map(|t| started + t),
            ..NelderMeadConfig::default()
        };
        if let Some(max_iter) = self.max_iter {
            config.max_iter = max_iter;
        }

        let bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); n_params];
        let initial = vec![0.0; n_params];
        let result = nelder_mead(objective, &initial, Some(bounds.as_slice()), &config);

        if result.timed_out {
            return Err(FitError::new(format!(
                "fit exceeded the time limit of {:?}",
                self.timeout.unwrap_or_default()
            )));
        }
        if !result.optimal_value.is_finite() {
            return Err(FitError::new("sum of squares is not finite"));
        }

        let params = SarimaParams::unpack(&result.optimal_point, order, seasonal);
        let (ar, ma) = params.operators(period);
        let innovations = css_innovations(&w, &ar, &ma);
        let n_eff = w.len() - ar.degree();
        let css = sum_of_squares(&innovations, ar.degree());
        let sigma2 = css / n_eff as f64;
        if !(sigma2.is_finite() && sigma2 > 0.0) {
            return Err(FitError::new(format!(
                "residual variance is degenerate ({})",
                sigma2
            )));
        }

        let n = n_eff as f64;
        let log_likelihood = -0.5 * n * ((2.0 * PI * sigma2).ln() + 1.0);
        let k = (n_params + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        debug!(
            model = %model_label(order, seasonal),
            iterations = result.iterations,
            converged = result.converged,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "optimiser finished"
        );

        Ok(SarimaModel {
            order,
            seasonal,
            params,
            sigma2,
            log_likelihood,
            aic,
            bic,
            n_obs: n_eff,
            history: values.to_vec(),
            residuals: innovations[ar.degree()..].to_vec(),
            innovations,
            full_ar: ar.multiply(&differencing),
            ma,
            differencing_degree: differencing.degree(),
            converged: result.converged,
        })
    }
}

/// `SARIMA(p,d,q)x(P,D,Q,s)`
pub fn model_label(order: Order, seasonal: SeasonalOrder) -> String {
    format!("SARIMA{}x{}", order, seasonal)
}

/// A fitted seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct SarimaModel {
    order: Order,
    seasonal: SeasonalOrder,
    params: SarimaParams,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    n_obs: usize,
    history: Vec<f64>,
    residuals: Vec<f64>,
    /// Residuals on the differenced scale, zero-padded at the start
    innovations: Vec<f64>,
    /// AR operator including differencing, used for forecasting
    full_ar: LagPolynomial,
    ma: LagPolynomial,
    differencing_degree: usize,
    converged: bool,
}

impl SarimaModel {
    /// Non-seasonal order
    pub fn order(&self) -> Order {
        self.order
    }

    /// Seasonal order
    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal
    }

    /// Estimated coefficients
    pub fn params(&self) -> &SarimaParams {
        &self.params
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Observations used in the likelihood
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Whether the optimiser met its tolerance
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Display label
    pub fn label(&self) -> String {
        model_label(self.order, self.seasonal)
    }

    fn innovation_at(&self, index: usize) -> f64 {
        index
            .checked_sub(self.differencing_degree)
            .and_then(|i| self.innovations.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

impl ModelHandle for SarimaModel {
    fn aic(&self) -> f64 {
        self.aic
    }

    fn bic(&self) -> f64 {
        self.bic
    }

    fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn forecast(&self, steps: usize, confidence_level: f64) -> Result<ForecastBands> {
        if steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least one step".to_string(),
            ));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                confidence_level
            )));
        }

        let n = self.history.len();
        let mut extended = self.history.clone();
        extended.reserve(steps);

        for h in 0..steps {
            let t = n + h;
            let mut value = 0.0;
            for i in 1..=self.full_ar.degree().min(t) {
                value -= self.full_ar.coefficient(i) * extended[t - i];
            }
            for j in 1..=self.ma.degree().min(t) {
                // future shocks have zero expectation
                if t - j < n {
                    value += self.ma.coefficient(j) * self.innovation_at(t - j);
                }
            }
            extended.push(value);
        }

        let z = two_sided_z(confidence_level)?;
        let psi = LagPolynomial::psi_weights(&self.full_ar, &self.ma, steps);
        let points = extended[n..].to_vec();

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (point, weight) in points.iter().zip(&psi) {
            cumulative += weight * weight;
            let margin = z * (self.sigma2 * cumulative).sqrt();
            lower.push(point - margin);
            upper.push(point + margin);
        }

        Ok(ForecastBands {
            points,
            lower,
            upper,
        })
    }
}
