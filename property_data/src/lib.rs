//! # Property Data
//!
//! Ingestion and descriptive analysis of HM Land Registry "Price Paid" records.
//!
//! ## Features
//!
//! - Typed transaction schema with an explicit optional-column contract
//! - Raw (headerless) Price Paid CSV parsing and processed CSV loading
//! - Price cleaning, deterministic sampling and multi-year loading
//! - Raw to processed conversion with seeded samples
//! - Dataset source resolution (real, synthetic, sample, multi-year)
//! - London postcode filters and postcode-area statistics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use property_data::{analysis, filters, DatasetSource};
//!
//! let resolved = DatasetSource::Auto.resolve("/srv/pricepaid")?;
//! let table = property_data::load_dataset(&resolved)?;
//!
//! let london = filters::filter_london(&table);
//! if let Some(cheapest) = analysis::most_affordable_area(&london) {
//!     println!("{}", cheapest);
//! }
//! # Ok::<(), property_data::DataError>(())
//! ```

pub mod analysis;
pub mod cleaning;
pub mod error;
pub mod filters;
pub mod generator;
pub mod loader;
pub mod postcode;
pub mod process;
pub mod schema;
pub mod source;

pub use crate::error::{DataError, Result};
pub use crate::loader::{load_dataset, load_multi_year, ProcessedLoader, RawPricePaidReader};
pub use crate::process::{process_multi_year, process_real, ProcessSummary};
pub use crate::schema::{PropertyType, TableSchema, Tenure, Transaction, TransactionTable};
pub use crate::source::{DatasetSource, ResolvedDataset};
