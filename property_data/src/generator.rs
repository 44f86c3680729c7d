//! Synthetic transaction generation for demos and tests

use crate::postcode::postcode_area;
use crate::schema::{PropertyType, TableSchema, Tenure, Transaction, TransactionTable};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Postcode areas used for generated records
pub const SYNTHETIC_AREAS: &[&str] = &[
    "AB", "AL", "B", "BA", "BB", "BD", "BH", "BL", "BN", "BR", "BS", "BT", "CA", "CB", "CF", "CH",
    "CM", "CO", "CR", "CT", "CV", "CW", "DA", "DD", "DE", "DG", "DH", "DL", "DN", "DT", "DY", "E",
    "EC", "EH", "EN", "EX", "FK", "FY", "G", "GL", "GU", "GY", "HA", "HD", "HG", "HP", "HR", "HS",
    "HU", "HX", "IG", "IM", "IP", "IV", "JE", "KA", "KT", "KW", "KY", "L", "LA", "LD", "LE", "LL",
    "LN", "LS", "LU", "M", "ME", "MK", "ML", "N", "NE", "NG", "NN", "NP", "NR", "NW", "OL", "OX",
    "PA", "PE", "PH", "PL", "PO", "PR", "RG", "RH", "RM", "S", "SA", "SE", "SG", "SK", "SL", "SM",
    "SN", "SO", "SP", "SR", "SS", "ST", "SW", "SY", "TA", "TD", "TF", "TN", "TQ", "TR", "TS", "TW",
    "UB", "W", "WA", "WC", "WD", "WF", "WN", "WR", "WS", "WV", "YO", "ZE",
];

const PROPERTY_TYPES: [PropertyType; 4] = [
    PropertyType::Flat,
    PropertyType::Detached,
    PropertyType::SemiDetached,
    PropertyType::Terraced,
];

const MIN_PRICE: u64 = 100_000;
const MAX_PRICE: u64 = 2_000_000;

/// Generate `n` random transactions dated within 2024
///
/// Prices are uniform in `[100_000, 2_000_000)`. The same seed always
/// yields the same table.
pub fn generate_synthetic(n: usize, seed: u64) -> TransactionTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let days_in_year = 366;

    let rows = (0..n)
        .map(|_| {
            let area = SYNTHETIC_AREAS.choose(&mut rng).copied().unwrap_or("E");
            let postcode = format!(
                "{}{} {}{}{}",
                area,
                rng.gen_range(1..=20),
                rng.gen_range(1..=9),
                (b'A' + rng.gen_range(0..26u8)) as char,
                (b'A' + rng.gen_range(0..26u8)) as char,
            );

            Transaction {
                price: rng.gen_range(MIN_PRICE..MAX_PRICE),
                date: start + Duration::days(rng.gen_range(0..days_in_year)),
                postcode_area: postcode_area(&postcode).unwrap_or_else(|| area.to_string()),
                postcode,
                property_type: PROPERTY_TYPES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(PropertyType::Flat),
                new_build: rng.gen_bool(0.5),
                tenure: if rng.gen_bool(0.5) {
                    Tenure::Freehold
                } else {
                    Tenure::Leasehold
                },
                city: None,
            }
        })
        .collect();

    TransactionTable::new(rows, TableSchema { has_city: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_rows_are_in_range() {
        let table = generate_synthetic(500, 7);
        assert_eq!(table.len(), 500);
        for t in table.rows() {
            assert!((MIN_PRICE..MAX_PRICE).contains(&t.price));
            assert_eq!(t.date.format("%Y").to_string(), "2024");
            assert!(SYNTHETIC_AREAS.contains(&t.postcode_area.as_str()));
        }
    }

    #[test]
    fn test_area_list_is_distinct() {
        let distinct: std::collections::BTreeSet<_> = SYNTHETIC_AREAS.iter().collect();
        assert_eq!(SYNTHETIC_AREAS.len(), 124);
        assert_eq!(distinct.len(), SYNTHETIC_AREAS.len());
    }

    #[test]
    fn test_same_seed_same_table() {
        assert_eq!(
            generate_synthetic(50, 11).rows(),
            generate_synthetic(50, 11).rows()
        );
    }
}
