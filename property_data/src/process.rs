//! Raw download to processed dataset pipeline

use crate::cleaning::sample;
use crate::error::Result;
use crate::loader::{load_multi_year, write_processed, RawPricePaidReader};
use crate::source::{MULTI_YEAR_DATASET, MULTI_YEAR_SAMPLE, REAL_DATASET, SAMPLE_DATASET};
use std::path::Path;
use tracing::info;

/// Rows kept in the single-year sample
pub const REAL_SAMPLE_SIZE: usize = 5_000;
/// Rows kept in the multi-year sample
pub const MULTI_YEAR_SAMPLE_SIZE: usize = 10_000;
/// Seed shared by both samples
pub const SAMPLE_SEED: u64 = 42;

/// Row counts written by a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    pub rows: usize,
    pub sampled: usize,
}

/// Convert `data/raw/pp-{year}.csv` into the real dataset and its sample
///
/// The real dataset keeps every parseable row; price cleaning happens when
/// it is loaded for analysis.
pub fn process_real<P: AsRef<Path>>(data_root: P, year: i32) -> Result<ProcessSummary> {
    let root = data_root.as_ref();
    let raw = root.join("data").join("raw").join(format!("pp-{}.csv", year));

    let table = RawPricePaidReader::read(&raw)?;
    write_processed(&table, root.join(REAL_DATASET))?;

    let sampled = sample(&table, REAL_SAMPLE_SIZE, SAMPLE_SEED);
    write_processed(&sampled, root.join(SAMPLE_DATASET))?;

    info!(year, rows = table.len(), sampled = sampled.len(), "processed real dataset");
    Ok(ProcessSummary {
        rows: table.len(),
        sampled: sampled.len(),
    })
}

/// Clean and combine several raw years into the multi-year dataset and its sample
pub fn process_multi_year<P: AsRef<Path>>(data_root: P, years: &[i32]) -> Result<ProcessSummary> {
    let root = data_root.as_ref();

    let table = load_multi_year(root, years)?;
    write_processed(&table, root.join(MULTI_YEAR_DATASET))?;

    let sampled = sample(&table, MULTI_YEAR_SAMPLE_SIZE, SAMPLE_SEED);
    write_processed(&sampled, root.join(MULTI_YEAR_SAMPLE))?;

    info!(rows = table.len(), sampled = sampled.len(), "processed multi-year dataset");
    Ok(ProcessSummary {
        rows: table.len(),
        sampled: sampled.len(),
    })
}
