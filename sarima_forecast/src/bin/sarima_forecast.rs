//! Fit SARIMA candidates to London average prices and forecast the next year
//!
//! ```text
//! sarima-forecast --frequency weekly --steps 52 --rows 10
//! ```

use clap::Parser;
use property_data::analysis::format_pounds;
use sarima_forecast::chart::{ChartSink, CsvChartSink};
use sarima_forecast::dataset::load_london;
use sarima_forecast::diagnostics::diagnose;
use sarima_forecast::report::{render_forecast_table, render_table};
use sarima_forecast::{
    presets, AnalysisConfig, ForecastGenerator, Frequency, ModelCandidate, SarimaFitter,
    SearchEngine, SeriesBuilder, StationarityChecker, TableRequest, ValueMode,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "SARIMA fitting and forecasting for London prices")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processed dataset to load instead of raw yearly files (auto, real, synthetic, sample, multi-year)
    #[arg(long)]
    source: Option<String>,

    /// Years of raw Price Paid downloads to combine
    #[arg(long, value_delimiter = ',', default_value = "2022,2023,2024")]
    years: Vec<i32>,

    /// Resampling frequency (weekly, monthly, quarterly); defaults to the configured one
    #[arg(short, long)]
    frequency: Option<String>,

    /// JSON file of candidate models
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Forecast horizon; defaults to one seasonal cycle
    #[arg(short, long)]
    steps: Option<usize>,

    /// Confidence level for the forecast interval
    #[arg(long)]
    confidence: Option<f64>,

    /// Forecast rows to print
    #[arg(long, default_value = "10")]
    rows: usize,

    /// Recent periods the forecast is compared with
    #[arg(long, default_value = "26")]
    recent: usize,

    /// Evaluate candidates in parallel
    #[arg(long)]
    parallel: bool,

    /// Where to write the forecast JSON; defaults to outputs/forecast.json under the data root
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AnalysisConfig::load(args.config.as_ref())?;
    let frequency: Frequency = match &args.frequency {
        Some(name) => name.parse()?,
        None => config.default_frequency,
    };

    println!("SARIMA MODEL FITTING AND FORECASTING");
    println!("{}", "=".repeat(50));

    let request = TableRequest::from_args(args.source.as_deref(), &args.years)?;
    let london = load_london(&config.data_root, &request)?;
    let series = SeriesBuilder::new().build(&london, ValueMode::Mean, frequency)?;

    println!("\nLondon property time series:");
    println!("  Data points: {}", series.len());
    if let (Some(first), Some(last)) = (series.timestamps().first(), series.last_timestamp()) {
        println!("  Period: {} to {}", first.format("%Y-%m"), last.format("%Y-%m"));
    }
    if let Ok(average) = price_math::mean(series.values()) {
        println!("  Average price: {}", format_pounds(average));
    }

    let checker = StationarityChecker::with_significance(config.significance)?;
    match checker.analyze_parameters(&series) {
        Ok(guide) => {
            println!("\nStationarity (original series):\n{}", guide.differencing.original);
            println!("\nParameter guide:\n{}", guide);
        }
        Err(e) => warn!(error = %e, "stationarity check skipped"),
    }

    let candidates = match &args.candidates {
        Some(path) => ModelCandidate::load_list(path)?,
        None => presets::price_candidates(frequency.default_seasonal_period()),
    };

    let engine =
        SearchEngine::new(SarimaFitter::from_config(&config)).parallel(config.parallel || args.parallel);
    let result = engine.compare(&series, &candidates);
    println!("\n{}", render_table(&result));

    let best = match result.best() {
        Some(best) => best,
        None => {
            println!("\nNo forecast produced: every candidate failed");
            return Ok(());
        }
    };
    let (handle, last) = match (best.handle(), series.last_timestamp()) {
        (Some(handle), Some(last)) => (handle, last),
        _ => return Ok(()),
    };

    println!("\nBest model: {}", best.candidate().display_label());
    match diagnose(handle) {
        Ok(diagnostics) => println!("{}", diagnostics),
        Err(e) => warn!(error = %e, "diagnostics unavailable"),
    }

    let generator = ForecastGenerator::new(&config);
    let forecast = generator.forecast(handle, args.steps, last, frequency, args.confidence)?;

    println!(
        "\nFORECAST ({} periods, {:.0}% interval):",
        forecast.len(),
        forecast.confidence_level() * 100.0
    );
    println!("{}", render_forecast_table(&forecast, args.rows));

    let recent = series.tail(args.recent);
    match forecast.summary(recent.values()) {
        Ok(summary) => println!("FORECAST ANALYSIS:\n{}", summary),
        Err(e) => warn!(error = %e, "forecast summary unavailable"),
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir().join("forecast.json"));
    forecast.write_json(&output)?;
    info!(path = %output.display(), "forecast written");

    let charts = CsvChartSink::new(&config.data_root);
    let title = format!("London {} Price Forecast", frequency.title());
    if let Err(e) = charts.forecast(&series, &forecast, &title, None) {
        error!(error = %e, "could not write chart data");
    }

    Ok(())
}
