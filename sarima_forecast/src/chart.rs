//! Plot-ready data output
//!
//! Rendering is left to external tools; a sink receives the data and a
//! destination and reports where it was written.

use crate::error::Result;
use crate::forecast::ForecastResult;
use crate::series::TimeSeries;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for chart data
pub trait ChartSink {
    /// Emit one series, returning the written path
    fn series(&self, series: &TimeSeries, title: &str, dest: Option<&Path>) -> Result<PathBuf>;

    /// Emit history followed by a forecast with its interval
    fn forecast(
        &self,
        history: &TimeSeries,
        forecast: &ForecastResult,
        title: &str,
        dest: Option<&Path>,
    ) -> Result<PathBuf>;
}

/// Lowercase a title and replace whitespace with underscores
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Serialize)]
struct SeriesRecord {
    timestamp: String,
    value: f64,
}

#[derive(Serialize)]
struct ForecastRecord {
    timestamp: String,
    kind: &'static str,
    value: f64,
    lower: Option<f64>,
    upper: Option<f64>,
}

/// Writes chart data as CSV under `<data_root>/outputs/charts/`
#[derive(Debug, Clone)]
pub struct CsvChartSink {
    directory: PathBuf,
}

impl CsvChartSink {
    /// Sink writing into `<data_root>/outputs/charts`
    pub fn new<P: AsRef<Path>>(data_root: P) -> Self {
        Self {
            directory: data_root.as_ref().join("outputs").join("charts"),
        }
    }

    /// Default directory of this sink
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn destination(&self, title: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let path = match dest {
            Some(path) => path.to_path_buf(),
            None => self.directory.join(format!("{}.csv", slugify(title))),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

impl ChartSink for CsvChartSink {
    fn series(&self, series: &TimeSeries, title: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let path = self.destination(title, dest)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for (timestamp, value) in series.points() {
            writer.serialize(SeriesRecord {
                timestamp: timestamp.format("%Y-%m-%d").to_string(),
                value,
            })?;
        }
        writer.flush()?;

        info!(path = %path.display(), points = series.len(), "wrote series chart data");
        Ok(path)
    }

    fn forecast(
        &self,
        history: &TimeSeries,
        forecast: &ForecastResult,
        title: &str,
        dest: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = self.destination(title, dest)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for (timestamp, value) in history.points() {
            writer.serialize(ForecastRecord {
                timestamp: timestamp.format("%Y-%m-%d").to_string(),
                kind: "history",
                value,
                lower: None,
                upper: None,
            })?;
        }
        for row in forecast.rows() {
            writer.serialize(ForecastRecord {
                timestamp: row.timestamp.format("%Y-%m-%d").to_string(),
                kind: "forecast",
                value: row.point,
                lower: Some(row.lower),
                upper: Some(row.upper),
            })?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            history = history.len(),
            horizon = forecast.len(),
            "wrote forecast chart data"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("London Weekly Prices"), "london_weekly_prices");
        assert_eq!(slugify("  Volume (Monthly)  "), "volume_monthly");
    }
}
