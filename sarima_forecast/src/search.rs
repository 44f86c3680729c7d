//! Candidate evaluation and minimum-AIC selection

use crate::error::FitError;
use crate::fitter::{model_label, ModelFitter, ModelHandle, Order, SarimaFitter, SeasonalOrder};
use crate::series::TimeSeries;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One `(order, seasonal_order)` pair to evaluate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub order: Order,
    pub seasonal_order: SeasonalOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ModelCandidate {
    /// Create an unlabelled candidate
    pub fn new(order: Order, seasonal_order: SeasonalOrder) -> Self {
        Self {
            order,
            seasonal_order,
            label: None,
        }
    }

    /// Attach a display label
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, or `SARIMA(p,d,q)x(P,D,Q,s)` when unlabelled
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| model_label(self.order, self.seasonal_order))
    }

    /// Read a JSON array of candidates
    pub fn load_list<P: AsRef<Path>>(path: P) -> crate::error::Result<Vec<Self>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Result of fitting one candidate
#[derive(Debug)]
pub enum FitOutcome<H> {
    Success {
        candidate: ModelCandidate,
        handle: H,
        aic: f64,
        bic: f64,
    },
    Failure {
        candidate: ModelCandidate,
        error: FitError,
    },
}

impl<H> FitOutcome<H> {
    /// The candidate this outcome belongs to
    pub fn candidate(&self) -> &ModelCandidate {
        match self {
            FitOutcome::Success { candidate, .. } | FitOutcome::Failure { candidate, .. } => {
                candidate
            }
        }
    }

    /// AIC when the fit succeeded
    pub fn aic(&self) -> Option<f64> {
        match self {
            FitOutcome::Success { aic, .. } => Some(*aic),
            FitOutcome::Failure { .. } => None,
        }
    }

    /// BIC when the fit succeeded
    pub fn bic(&self) -> Option<f64> {
        match self {
            FitOutcome::Success { bic, .. } => Some(*bic),
            FitOutcome::Failure { .. } => None,
        }
    }

    /// The fitted handle when the fit succeeded
    pub fn handle(&self) -> Option<&H> {
        match self {
            FitOutcome::Success { handle, .. } => Some(handle),
            FitOutcome::Failure { .. } => None,
        }
    }

    /// The error when the fit failed
    pub fn error(&self) -> Option<&FitError> {
        match self {
            FitOutcome::Success { .. } => None,
            FitOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FitOutcome::Success { .. })
    }
}

/// Outcomes of one search, in candidate order
#[derive(Debug)]
pub struct ComparisonResult<H> {
    outcomes: Vec<FitOutcome<H>>,
}

impl<H> ComparisonResult<H> {
    /// Wrap outcomes that are already in candidate order
    pub fn new(outcomes: Vec<FitOutcome<H>>) -> Self {
        Self { outcomes }
    }

    /// All outcomes
    pub fn outcomes(&self) -> &[FitOutcome<H>] {
        &self.outcomes
    }

    /// Number of candidates evaluated
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of successful fits
    pub fn successful_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Index of the minimum-AIC success, earliest on ties
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if let Some(aic) = outcome.aic() {
                if aic.is_nan() {
                    continue;
                }
                if best.map_or(true, |(_, current)| aic < current) {
                    best = Some((i, aic));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// The minimum-AIC success, `None` if every candidate failed
    pub fn best(&self) -> Option<&FitOutcome<H>> {
        self.best_index().map(|i| &self.outcomes[i])
    }

    /// Consume the result and take ownership of the best outcome
    pub fn into_best(mut self) -> Option<FitOutcome<H>> {
        let index = self.best_index()?;
        Some(self.outcomes.swap_remove(index))
    }
}

/// Evaluates candidate lists against a series
#[derive(Debug, Clone, Default)]
pub struct SearchEngine<F = SarimaFitter> {
    fitter: F,
    parallel: bool,
}

impl SearchEngine<SarimaFitter> {
    /// Engine backed by the default SARIMA fitter
    pub fn sarima() -> Self {
        Self::new(SarimaFitter::new())
    }
}

impl<F: ModelFitter> SearchEngine<F> {
    /// Create a sequential engine around a fitter
    pub fn new(fitter: F) -> Self {
        Self {
            fitter,
            parallel: false,
        }
    }

    /// Evaluate candidates on the rayon pool
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// The underlying fitter
    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    /// Fit one order, inferring the seasonal order from the series length
    /// when none is given
    pub fn fit_one(
        &self,
        series: &TimeSeries,
        order: Order,
        seasonal: Option<SeasonalOrder>,
    ) -> std::result::Result<F::Handle, FitError> {
        let seasonal = seasonal.unwrap_or_else(|| SeasonalOrder::default_for_len(series.len()));
        self.fitter.fit(series.values(), order, seasonal)
    }

    fn evaluate(&self, values: &[f64], candidate: &ModelCandidate) -> FitOutcome<F::Handle> {
        let label = candidate.display_label();
        info!(model = %label, "fitting candidate");

        match self
            .fitter
            .fit(values, candidate.order, candidate.seasonal_order)
        {
            Ok(handle) => {
                let aic = handle.aic();
                let bic = handle.bic();
                info!(model = %label, aic, bic, "candidate fitted");
                FitOutcome::Success {
                    candidate: candidate.clone(),
                    handle,
                    aic,
                    bic,
                }
            }
            Err(error) => {
                warn!(model = %label, error = %error, "candidate failed");
                FitOutcome::Failure {
                    candidate: candidate.clone(),
                    error,
                }
            }
        }
    }

    /// Fit every candidate against `series`
    ///
    /// Failures are recorded, never propagated. Outcomes keep the order of
    /// `candidates` on both the sequential and the parallel path.
    pub fn compare(
        &self,
        series: &TimeSeries,
        candidates: &[ModelCandidate],
    ) -> ComparisonResult<F::Handle>
    where
        F: Sync,
        F::Handle: Send,
    {
        let values = series.values();
        let outcomes: Vec<_> = if self.parallel {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate(values, candidate))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| self.evaluate(values, candidate))
                .collect()
        };

        let result = ComparisonResult::new(outcomes);
        match result.best() {
            Some(best) => info!(
                successes = result.successful_count(),
                total = result.len(),
                best = %best.candidate().display_label(),
                aic = best.aic().unwrap_or(f64::NAN),
                "search finished"
            ),
            None => warn!(total = result.len(), "no models fitted successfully"),
        }
        result
    }
}
