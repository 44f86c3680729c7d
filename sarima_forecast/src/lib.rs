//! # SARIMA Forecast
//!
//! Model search, comparison and forecasting for property price and sales
//! volume series.
//!
//! ## Features
//!
//! - Weekly, monthly and quarterly resampling of transaction tables
//! - Augmented Dickey-Fuller stationarity checks with MacKinnon p-values
//! - Seasonal ARIMA estimation by conditional sum of squares
//! - Minimum-AIC search over caller-supplied candidate lists, sequential or on rayon
//! - Dated forecasts with confidence intervals
//! - Text, JSON and plot-data reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sarima_forecast::{
//!     presets, AnalysisConfig, ForecastGenerator, Frequency, SearchEngine, SeriesBuilder,
//!     ValueMode,
//! };
//!
//! let config = AnalysisConfig::default();
//! let resolved = property_data::DatasetSource::Auto.resolve(&config.data_root)?;
//! let table = property_data::load_dataset(&resolved)?;
//!
//! let series = SeriesBuilder::new().build(&table, ValueMode::Mean, Frequency::Weekly)?;
//! let result = SearchEngine::sarima().compare(&series, &presets::price_candidates(52));
//!
//! if let (Some(best), Some(last)) = (result.best(), series.last_timestamp()) {
//!     if let Some(handle) = best.handle() {
//!         let forecast =
//!             ForecastGenerator::new(&config).forecast(handle, None, last, Frequency::Weekly, None)?;
//!         println!("{}", sarima_forecast::report::render_forecast_table(&forecast, 10));
//!     }
//! }
//! # Ok::<(), sarima_forecast::ForecastError>(())
//! ```

pub mod chart;
pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod fitter;
pub mod forecast;
pub mod presets;
pub mod report;
pub mod search;
pub mod series;
pub mod stationarity;

// Re-export commonly used types
pub use crate::chart::{ChartSink, CsvChartSink};
pub use crate::config::AnalysisConfig;
pub use crate::dataset::TableRequest;
pub use crate::error::{FitError, ForecastError, Result};
pub use crate::fitter::{
    ModelFitter, ModelHandle, Order, SarimaFitter, SarimaModel, SeasonalOrder,
};
pub use crate::forecast::{ForecastGenerator, ForecastResult};
pub use crate::report::{ComparisonReporter, GlobalSummary};
pub use crate::search::{ComparisonResult, FitOutcome, ModelCandidate, SearchEngine};
pub use crate::series::{Frequency, SeriesBuilder, TimeSeries, ValueMode};
pub use crate::stationarity::{
    ParameterGuide, StationarityChecker, StationarityReport, SuggestedRanges,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
