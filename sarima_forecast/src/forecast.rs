//! Forecast generation on a continued calendar grid

use crate::config::AnalysisConfig;
use crate::error::{ForecastError, Result};
use crate::fitter::ModelHandle;
use crate::series::{Frequency, TimeSeries};
use chrono::NaiveDate;
use price_math::mean;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Point forecasts with lower and upper interval series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    points: TimeSeries,
    lower: TimeSeries,
    upper: TimeSeries,
    confidence_level: f64,
}

/// One row of a forecast table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Average forecast compared with recent history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub mean_forecast: f64,
    pub recent_mean: f64,
    pub change_pct: f64,
}

impl fmt::Display for ForecastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average forecast: {:.2}", self.mean_forecast)?;
        writeln!(f, "Recent average: {:.2}", self.recent_mean)?;
        write!(f, "Projected change: {:+.1}%", self.change_pct)
    }
}

impl ForecastResult {
    /// Point forecasts
    pub fn points(&self) -> &TimeSeries {
        &self.points
    }

    /// Lower interval bounds
    pub fn lower(&self) -> &TimeSeries {
        &self.lower
    }

    /// Upper interval bounds
    pub fn upper(&self) -> &TimeSeries {
        &self.upper
    }

    /// Confidence level of the intervals
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Forecast horizon
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows combining timestamp, point and bounds
    pub fn rows(&self) -> Vec<ForecastRow> {
        self.points
            .points()
            .zip(self.lower.values().iter().zip(self.upper.values()))
            .map(|((timestamp, point), (lower, upper))| ForecastRow {
                timestamp,
                point,
                lower: *lower,
                upper: *upper,
            })
            .collect()
    }

    /// Compare the mean forecast with the mean of `recent` values
    pub fn summary(&self, recent: &[f64]) -> Result<ForecastSummary> {
        if recent.is_empty() {
            return Err(ForecastError::EmptyInput(
                "No recent values to compare the forecast with".to_string(),
            ));
        }

        let mean_forecast = mean(self.points.values())?;
        let recent_mean = mean(recent)?;
        if recent_mean == 0.0 {
            return Err(ForecastError::MathError(
                "Recent mean is zero, change is undefined".to_string(),
            ));
        }

        Ok(ForecastSummary {
            mean_forecast,
            recent_mean,
            change_pct: (mean_forecast - recent_mean) / recent_mean * 100.0,
        })
    }

    /// Write the forecast as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Turns fitted models into dated forecasts
#[derive(Debug, Clone, Copy)]
pub struct ForecastGenerator {
    default_confidence_level: f64,
}

impl Default for ForecastGenerator {
    fn default() -> Self {
        Self {
            default_confidence_level: 0.95,
        }
    }
}

impl ForecastGenerator {
    /// Generator using the configured confidence level
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            default_confidence_level: config.default_confidence_level,
        }
    }

    /// Forecast `steps` periods after `last_timestamp`
    ///
    /// `steps` defaults to one seasonal cycle of `frequency` and the level
    /// to the configured one.
    pub fn forecast<H: ModelHandle + ?Sized>(
        &self,
        handle: &H,
        steps: Option<usize>,
        last_timestamp: NaiveDate,
        frequency: Frequency,
        confidence_level: Option<f64>,
    ) -> Result<ForecastResult> {
        let steps = steps.unwrap_or_else(|| frequency.default_horizon());
        let level = confidence_level.unwrap_or(self.default_confidence_level);
        if steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least one step".to_string(),
            ));
        }
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                level
            )));
        }

        let bands = handle.forecast(steps, level)?;
        if bands.points.len() != steps
            || bands.lower.len() != steps
            || bands.upper.len() != steps
        {
            return Err(ForecastError::ValidationError(format!(
                "Model returned {} points for a horizon of {}",
                bands.points.len(),
                steps
            )));
        }

        let timestamps: Vec<NaiveDate> = (1..=steps)
            .map(|i| frequency.advance(last_timestamp, i))
            .collect();

        info!(
            steps,
            confidence_level = level,
            start = %timestamps[0],
            end = %timestamps[steps - 1],
            "generated forecast"
        );

        Ok(ForecastResult {
            points: TimeSeries::new(timestamps.clone(), bands.points, frequency)?,
            lower: TimeSeries::new(timestamps.clone(), bands.lower, frequency)?,
            upper: TimeSeries::new(timestamps, bands.upper, frequency)?,
            confidence_level: level,
        })
    }
}
