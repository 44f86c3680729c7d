//! Analysis configuration
//!
//! Values are layered: defaults, then an optional JSON file, then
//! `PRICEPAID_*` environment variables.

use crate::error::{ForecastError, Result};
use crate::series::Frequency;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`AnalysisConfig::data_root`]
pub const ENV_DATA_ROOT: &str = "PRICEPAID_DATA_ROOT";
/// Environment variable overriding [`AnalysisConfig::default_frequency`]
pub const ENV_FREQUENCY: &str = "PRICEPAID_FREQUENCY";
/// Environment variable overriding [`AnalysisConfig::default_confidence_level`]
pub const ENV_CONFIDENCE: &str = "PRICEPAID_CONFIDENCE";
/// Environment variable overriding [`AnalysisConfig::parallel`]
pub const ENV_PARALLEL: &str = "PRICEPAID_PARALLEL";

/// Settings shared by the search, forecast and reporting components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding `data/` and `outputs/`
    pub data_root: PathBuf,
    /// Frequency used when none is requested
    pub default_frequency: Frequency,
    /// Confidence level for forecast intervals
    pub default_confidence_level: f64,
    /// Significance level for the unit-root test
    pub significance: f64,
    /// Evaluate candidates on the rayon pool
    pub parallel: bool,
    /// Wall-clock limit for a single fit
    pub fit_timeout_secs: Option<u64>,
    /// Iteration cap for the optimiser in a single fit
    pub fit_max_iter: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            default_frequency: Frequency::Weekly,
            default_confidence_level: 0.95,
            significance: 0.05,
            parallel: false,
            fit_timeout_secs: None,
            fit_max_iter: None,
        }
    }
}

impl AnalysisConfig {
    /// Load defaults, then the file if given, then the environment
    pub fn load<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::InvalidParameter(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Apply `PRICEPAID_*` environment variables
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_DATA_ROOT) {
            self.data_root = PathBuf::from(root);
        }

        if let Some(frequency) = lookup(ENV_FREQUENCY) {
            self.default_frequency = frequency.parse().map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid {}: {}", ENV_FREQUENCY, e))
            })?;
        }

        if let Some(level) = lookup(ENV_CONFIDENCE) {
            self.default_confidence_level = level.parse().map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid {}: {}", ENV_CONFIDENCE, e))
            })?;
        }

        if let Some(parallel) = lookup(ENV_PARALLEL) {
            self.parallel = parallel.parse().map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid {}: {}", ENV_PARALLEL, e))
            })?;
        }

        Ok(self)
    }

    /// Check that levels lie strictly between 0 and 1
    pub fn validate(&self) -> Result<()> {
        if !(self.default_confidence_level > 0.0 && self.default_confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                self.default_confidence_level
            )));
        }

        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Significance must be between 0 and 1, got {}",
                self.significance
            )));
        }

        if self.fit_timeout_secs == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Fit timeout must be positive".to_string(),
            ));
        }

        if self.fit_max_iter == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Fit iteration cap must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory plot data and reports are written to
    pub fn output_dir(&self) -> PathBuf {
        self.data_root.join("outputs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_confidence_level, 0.95);
        assert_eq!(config.default_frequency, Frequency::Weekly);
    }

    #[test]
    fn test_overrides() {
        let config = AnalysisConfig::default()
            .with_overrides_from(lookup(&[
                (ENV_DATA_ROOT, "/srv/pricepaid"),
                (ENV_FREQUENCY, "monthly"),
                (ENV_CONFIDENCE, "0.8"),
                (ENV_PARALLEL, "true"),
            ]))
            .unwrap();

        assert_eq!(config.data_root, PathBuf::from("/srv/pricepaid"));
        assert_eq!(config.default_frequency, Frequency::Monthly);
        assert_eq!(config.default_confidence_level, 0.8);
        assert!(config.parallel);
    }

    #[test]
    fn test_invalid_override() {
        let result =
            AnalysisConfig::default().with_overrides_from(lookup(&[(ENV_PARALLEL, "sometimes")]));
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

        let config = AnalysisConfig::default()
            .with_overrides_from(lookup(&[(ENV_CONFIDENCE, "1.5")]))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"default_frequency": "quarterly", "fit_timeout_secs": 30, "fit_max_iter": 200}}"#
        )
        .unwrap();

        let config = AnalysisConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.default_frequency, Frequency::Quarterly);
        assert_eq!(config.fit_timeout_secs, Some(30));
        assert_eq!(config.fit_max_iter, Some(200));
        assert!(config.validate().is_ok());

        let zero_cap = AnalysisConfig {
            fit_max_iter: Some(0),
            ..config
        };
        assert!(zero_cap.validate().is_err());
        assert_eq!(config.significance, 0.05);
    }
}
