//! Text and JSON reporting of model comparisons

use crate::forecast::ForecastResult;
use crate::search::{ComparisonResult, FitOutcome};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Characters of a failure message kept in tables
pub const ERROR_PREVIEW_CHARS: usize = 50;

const LABEL_WIDTH: usize = 32;
const NUMBER_WIDTH: usize = 12;

fn error_preview(message: &str) -> String {
    let head: String = message.chars().take(ERROR_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Format one comparison as a table of AIC and BIC per candidate
pub fn render_table<H>(result: &ComparisonResult<H>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<lw$} {:>nw$} {:>nw$}",
        "Model",
        "AIC",
        "BIC",
        lw = LABEL_WIDTH,
        nw = NUMBER_WIDTH
    );
    let _ = writeln!(out, "{}", "-".repeat(LABEL_WIDTH + 2 * NUMBER_WIDTH + 2));

    for outcome in result.outcomes() {
        let label = outcome.candidate().display_label();
        match outcome {
            FitOutcome::Success { aic, bic, .. } => {
                let _ = writeln!(
                    out,
                    "{:<lw$} {:>nw$.2} {:>nw$.2}",
                    label,
                    aic,
                    bic,
                    lw = LABEL_WIDTH,
                    nw = NUMBER_WIDTH
                );
            }
            FitOutcome::Failure { error, .. } => {
                let _ = writeln!(
                    out,
                    "{:<lw$} FAILED: {}",
                    label,
                    error_preview(&error.message),
                    lw = LABEL_WIDTH
                );
            }
        }
    }

    match result.best() {
        Some(best) => {
            let _ = write!(
                out,
                "Best model: {} (AIC: {:.2})",
                best.candidate().display_label(),
                best.aic().unwrap_or(f64::NAN)
            );
        }
        None => {
            let _ = write!(out, "no models fitted successfully");
        }
    }

    out
}

/// Format the first `limit` rows of a forecast
pub fn render_forecast_table(forecast: &ForecastResult, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>14} {:>14} {:>14}",
        "Date", "Forecast", "Lower", "Upper"
    );
    for row in forecast.rows().iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<12} {:>14.2} {:>14.2} {:>14.2}",
            row.timestamp.format("%Y-%m-%d").to_string(),
            row.point,
            row.lower,
            row.upper
        );
    }
    if forecast.len() > limit {
        let _ = writeln!(out, "... {} more periods", forecast.len() - limit);
    }
    out
}

/// Per-comparison line of a global summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub label: String,
    pub successes: usize,
    pub total: usize,
    pub best_model: Option<String>,
    pub best_aic: Option<f64>,
}

/// Best model across all comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalBest {
    pub comparison: String,
    pub model: String,
    pub aic: f64,
    pub bic: f64,
}

/// Aggregate view over several comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub comparisons: Vec<ComparisonSummary>,
    pub total_candidates: usize,
    pub total_successes: usize,
    pub best: Option<GlobalBest>,
}

impl fmt::Display for GlobalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Models fitted successfully: {}/{}",
            self.total_successes, self.total_candidates
        )?;
        for comparison in &self.comparisons {
            write!(
                f,
                "  {}: {}/{} successful",
                comparison.label, comparison.successes, comparison.total
            )?;
            match (&comparison.best_model, comparison.best_aic) {
                (Some(model), Some(aic)) => writeln!(f, ", best {} (AIC: {:.2})", model, aic)?,
                _ => writeln!(f, ", no successful models")?,
            }
        }
        match &self.best {
            Some(best) => write!(
                f,
                "Overall best: {} {} (AIC: {:.2}, BIC: {:.2})",
                best.comparison, best.model, best.aic, best.bic
            ),
            None => write!(f, "Overall best: none, no models fitted successfully"),
        }
    }
}

/// Builds global summaries from labelled comparisons
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonReporter;

impl ComparisonReporter {
    pub fn new() -> Self {
        Self
    }

    /// Summarise comparisons; the global best is the minimum AIC, taking
    /// the earliest comparison and then the earliest candidate on ties
    pub fn summarize<S, H>(&self, comparisons: &[(S, ComparisonResult<H>)]) -> GlobalSummary
    where
        S: AsRef<str>,
    {
        let mut summaries = Vec::with_capacity(comparisons.len());
        let mut best: Option<GlobalBest> = None;

        for (label, result) in comparisons {
            let label = label.as_ref();
            let winner = result.best();

            if let Some(outcome) = winner {
                if let (Some(aic), Some(bic)) = (outcome.aic(), outcome.bic()) {
                    if best.as_ref().map_or(true, |b| aic < b.aic) {
                        best = Some(GlobalBest {
                            comparison: label.to_string(),
                            model: outcome.candidate().display_label(),
                            aic,
                            bic,
                        });
                    }
                }
            }

            summaries.push(ComparisonSummary {
                label: label.to_string(),
                successes: result.successful_count(),
                total: result.len(),
                best_model: winner.map(|o| o.candidate().display_label()),
                best_aic: winner.and_then(|o| o.aic()),
            });
        }

        GlobalSummary {
            total_candidates: summaries.iter().map(|s| s.total).sum(),
            total_successes: summaries.iter().map(|s| s.successes).sum(),
            comparisons: summaries,
            best,
        }
    }
}
