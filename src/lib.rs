//! # Price Paid workspace
//!
//! `pricepaid_workspace` bundles the workspace crates behind one dependency.
//!
//! - [`price_math`]: descriptive statistics, OLS, Nelder-Mead and lag polynomials
//! - [`property_data`]: Price Paid ingestion, filters and area analysis
//! - [`sarima_forecast`]: series building, SARIMA search, forecasting and reports
//!
//! ## Example
//!
//! ```
//! use pricepaid_workspace::property_data::generator::generate_synthetic;
//! use pricepaid_workspace::sarima_forecast::{Frequency, SeriesBuilder, ValueMode};
//!
//! let table = generate_synthetic(1_000, 42);
//! let series = SeriesBuilder::new()
//!     .build(&table, ValueMode::Count, Frequency::Monthly)
//!     .unwrap();
//! assert_eq!(series.len(), 12);
//! assert_eq!(series.values().iter().sum::<f64>(), 1_000.0);
//! ```

pub use price_math;
pub use property_data;
pub use sarima_forecast;

#[cfg(test)]
mod tests {
    use super::*;
    use property_data::generator::generate_synthetic;
    use sarima_forecast::{presets, Frequency, SearchEngine, SeriesBuilder, ValueMode};

    #[test]
    fn test_synthetic_table_feeds_search() {
        let table = generate_synthetic(3_000, 8);
        let series = SeriesBuilder::new()
            .build(&table, ValueMode::Count, Frequency::Weekly)
            .unwrap();

        let candidates = presets::volume_candidates(4, "Weekly");
        let result = SearchEngine::sarima().compare(&series, &candidates);
        assert_eq!(result.len(), candidates.len());
    }

    #[test]
    fn test_crates_are_reachable() {
        assert_eq!(sarima_forecast::NAME, "sarima_forecast");
        assert_eq!(price_math::mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }
}
