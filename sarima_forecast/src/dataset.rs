//! Loading the transaction table the command line tools analyse

use crate::error::Result;
use property_data::{filters, load_dataset, load_multi_year, DatasetSource, TransactionTable};
use std::path::Path;
use tracing::info;

/// Years combined when no dataset is named
pub const DEFAULT_YEARS: [i32; 3] = [2022, 2023, 2024];

/// Where a transaction table comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRequest {
    /// A processed dataset file
    Dataset(DatasetSource),
    /// Raw yearly Price Paid downloads
    Years(Vec<i32>),
}

impl Default for TableRequest {
    fn default() -> Self {
        TableRequest::Years(DEFAULT_YEARS.to_vec())
    }
}

impl TableRequest {
    /// A named dataset when `source` is given, otherwise the raw `years`
    pub fn from_args(source: Option<&str>, years: &[i32]) -> Result<Self> {
        match source {
            Some(name) => Ok(TableRequest::Dataset(name.parse()?)),
            None if years.is_empty() => Ok(TableRequest::default()),
            None => Ok(TableRequest::Years(years.to_vec())),
        }
    }
}

/// Load the requested table under `data_root`
pub fn load_table<P: AsRef<Path>>(data_root: P, request: &TableRequest) -> Result<TransactionTable> {
    let root = data_root.as_ref();
    let table = match request {
        TableRequest::Dataset(source) => {
            let resolved = source.resolve(root)?;
            info!(source = %resolved.source, path = %resolved.path.display(), "loading dataset");
            load_dataset(&resolved)?
        }
        TableRequest::Years(years) => load_multi_year(root, years)?,
    };
    Ok(table)
}

/// Load the requested table and keep London transactions only
pub fn load_london<P: AsRef<Path>>(data_root: P, request: &TableRequest) -> Result<TransactionTable> {
    let table = load_table(data_root, request)?;
    let london = filters::filter_london(&table);
    info!(total = table.len(), london = london.len(), "filtered London transactions");
    Ok(london)
}

#[cfg(test)]
mod tests {
    use super::*;
    use property_data::generator::generate_synthetic;
    use property_data::loader::write_processed;
    use property_data::source::SYNTHETIC_DATASET;
    use tempfile::tempdir;

    #[test]
    fn test_load_synthetic_dataset() {
        let dir = tempdir().unwrap();
        let table = generate_synthetic(200, 7);
        write_processed(&table, dir.path().join(SYNTHETIC_DATASET)).unwrap();

        let loaded = load_table(dir.path(), &TableRequest::Dataset(DatasetSource::Auto)).unwrap();
        assert_eq!(loaded.len(), 200);

        let london = load_london(dir.path(), &TableRequest::Dataset(DatasetSource::Synthetic)).unwrap();
        assert!(london.len() <= 200);
        assert!(london
            .rows()
            .iter()
            .all(|row| property_data::postcode::is_london_area(&row.postcode_area)));
    }

    #[test]
    fn test_request_from_args() {
        assert_eq!(
            TableRequest::from_args(Some("multi-year"), &[2023]).unwrap(),
            TableRequest::Dataset(DatasetSource::MultiYear)
        );
        assert_eq!(
            TableRequest::from_args(None, &[2023]).unwrap(),
            TableRequest::Years(vec![2023])
        );
        assert_eq!(TableRequest::from_args(None, &[]).unwrap(), TableRequest::default());
        assert!(TableRequest::from_args(Some("parquet"), &[]).is_err());
    }

    #[test]
    fn test_missing_years_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_table(dir.path(), &TableRequest::default()).is_err());
    }
}
