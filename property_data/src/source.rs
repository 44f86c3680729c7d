//! Dataset source selection

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Processed real-world dataset, relative to the data root
pub const REAL_DATASET: &str = "data/processed/property_data_real.csv";
/// Generated dataset
pub const SYNTHETIC_DATASET: &str = "data/processed/property_data_synthetic.csv";
/// Small sample of the real dataset
pub const SAMPLE_DATASET: &str = "data/samples/property_data_real_sample.csv";
/// Several years of cleaned raw downloads
pub const MULTI_YEAR_DATASET: &str = "data/processed/property_data_multi_year.csv";
/// Sample of the multi-year dataset
pub const MULTI_YEAR_SAMPLE: &str = "data/samples/property_data_multi_year_sample.csv";

/// Which processed dataset to analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetSource {
    /// Real data when available, otherwise synthetic
    Auto,
    Real,
    Synthetic,
    Sample,
    MultiYear,
}

/// A dataset source together with the file it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataset {
    /// The concrete source, never `Auto`
    pub source: DatasetSource,
    /// Absolute or data-root-relative path of the file
    pub path: PathBuf,
}

impl DatasetSource {
    /// Relative path of the file backing a concrete source
    pub fn relative_path(&self) -> Option<&'static str> {
        match self {
            DatasetSource::Auto => None,
            DatasetSource::Real => Some(REAL_DATASET),
            DatasetSource::Synthetic => Some(SYNTHETIC_DATASET),
            DatasetSource::Sample => Some(SAMPLE_DATASET),
            DatasetSource::MultiYear => Some(MULTI_YEAR_DATASET),
        }
    }

    /// Resolve to an existing file under `data_root`
    ///
    /// `Auto` prefers the real dataset and falls back to the synthetic one.
    /// An explicit source whose file is missing is an error naming the path.
    pub fn resolve<P: AsRef<Path>>(&self, data_root: P) -> Result<ResolvedDataset> {
        let root = data_root.as_ref();

        let source = match self {
            DatasetSource::Auto => {
                if root.join(REAL_DATASET).exists() {
                    DatasetSource::Real
                } else {
                    DatasetSource::Synthetic
                }
            }
            other => *other,
        };

        let relative = source.relative_path().unwrap_or(SYNTHETIC_DATASET);
        let path = root.join(relative);
        if !path.exists() {
            return Err(DataError::MissingDataset { path });
        }

        Ok(ResolvedDataset { source, path })
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetSource::Auto => "auto",
            DatasetSource::Real => "real",
            DatasetSource::Synthetic => "synthetic",
            DatasetSource::Sample => "sample",
            DatasetSource::MultiYear => "multi-year",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DatasetSource {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DatasetSource::Auto),
            "real" => Ok(DatasetSource::Real),
            "synthetic" => Ok(DatasetSource::Synthetic),
            "sample" => Ok(DatasetSource::Sample),
            "multi-year" | "multi_year" | "multiyear" => Ok(DatasetSource::MultiYear),
            other => Err(DataError::Parse(format!("Unknown dataset source '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "Price\n").unwrap();
    }

    #[test]
    fn test_auto_prefers_real() {
        let dir = tempdir().unwrap();
        touch(dir.path(), REAL_DATASET);
        touch(dir.path(), SYNTHETIC_DATASET);

        let resolved = DatasetSource::Auto.resolve(dir.path()).unwrap();
        assert_eq!(resolved.source, DatasetSource::Real);
        assert!(resolved.path.ends_with(REAL_DATASET));
    }

    #[test]
    fn test_auto_falls_back_to_synthetic() {
        let dir = tempdir().unwrap();
        touch(dir.path(), SYNTHETIC_DATASET);

        let resolved = DatasetSource::Auto.resolve(dir.path()).unwrap();
        assert_eq!(resolved.source, DatasetSource::Synthetic);
    }

    #[test]
    fn test_missing_explicit_source_names_path() {
        let dir = tempdir().unwrap();
        match DatasetSource::Sample.resolve(dir.path()) {
            Err(DataError::MissingDataset { path }) => assert!(path.ends_with(SAMPLE_DATASET)),
            other => panic!("expected missing dataset, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_source_names() {
        assert_eq!("multi-year".parse::<DatasetSource>().unwrap(), DatasetSource::MultiYear);
        assert_eq!("REAL".parse::<DatasetSource>().unwrap(), DatasetSource::Real);
        assert!("remote".parse::<DatasetSource>().is_err());
    }
}
