//! Postcode-area filters

use crate::postcode::{is_central_london_area, is_london_area};
use crate::schema::TransactionTable;
use tracing::info;

/// Transactions in Greater London postcode areas
pub fn filter_london(table: &TransactionTable) -> TransactionTable {
    let london = table.filter(|t| is_london_area(&t.postcode_area));
    info!(kept = london.len(), total = table.len(), "filtered to London properties");
    london
}

/// Transactions in Central London postcode areas
pub fn filter_central_london(table: &TransactionTable) -> TransactionTable {
    let central = table.filter(|t| is_central_london_area(&t.postcode_area));
    info!(kept = central.len(), total = table.len(), "filtered to Central London properties");
    central
}

/// Transactions in any of the given areas (case-insensitive)
pub fn filter_by_areas<S: AsRef<str>>(table: &TransactionTable, areas: &[S]) -> TransactionTable {
    let wanted: Vec<String> = areas
        .iter()
        .map(|a| a.as_ref().trim().to_ascii_uppercase())
        .collect();
    let filtered = table.filter(|t| wanted.iter().any(|a| *a == t.postcode_area));
    info!(kept = filtered.len(), areas = %wanted.join(", "), "filtered by postcode areas");
    filtered
}
