//! Price cleaning and sampling

use crate::schema::TransactionTable;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Prices below this are treated as non-market transfers
pub const MIN_REASONABLE_PRICE: u64 = 30_000;

/// Drop transactions priced below `floor`, returning the kept table and
/// the number of removed rows
pub fn clean_prices(table: &TransactionTable, floor: u64) -> (TransactionTable, usize) {
    let cleaned = table.filter(|t| t.price >= floor);
    let removed = table.len() - cleaned.len();
    (cleaned, removed)
}

/// Deterministic random sample of up to `n` rows, preserving input order
pub fn sample(table: &TransactionTable, n: usize, seed: u64) -> TransactionTable {
    if n >= table.len() {
        return table.clone();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, table.len(), n).into_vec();
    picked.sort_unstable();

    let rows = picked
        .into_iter()
        .map(|i| table.rows()[i].clone())
        .collect();
    TransactionTable::new(rows, table.schema())
}
