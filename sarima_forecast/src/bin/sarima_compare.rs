//! Compare SARIMA models on London sales volume at weekly and monthly resolution
//!
//! ```text
//! sarima-compare --years 2022,2023,2024 --summary-json outputs/volume_summary.json
//! ```

use clap::Parser;
use sarima_forecast::chart::{ChartSink, CsvChartSink};
use sarima_forecast::dataset::load_london;
use sarima_forecast::report::{render_table, ComparisonReporter};
use sarima_forecast::{
    presets, AnalysisConfig, ComparisonResult, Frequency, ModelCandidate, SarimaFitter,
    SarimaModel, SearchEngine, SeriesBuilder, TableRequest, ValueMode,
};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare SARIMA models on London sales volume")]
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

    /// JSON file of candidate models used for every frequency
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Evaluate candidates in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the global summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AnalysisConfig::load(args.config.as_ref())?;

    println!("SARIMA MODEL COMPARISON - LONDON SALES VOLUME");
    println!("{}", "=".repeat(70));

    let request = TableRequest::from_args(args.source.as_deref(), &args.years)?;
    let london = load_london(&config.data_root, &request)?;

    let custom: Option<Vec<ModelCandidate>> = match &args.candidates {
        Some(path) => Some(ModelCandidate::load_list(path)?),
        None => None,
    };

    let engine =
        SearchEngine::new(SarimaFitter::from_config(&config)).parallel(config.parallel || args.parallel);
    let charts = CsvChartSink::new(&config.data_root);

    let mut comparisons: Vec<(String, ComparisonResult<SarimaModel>)> = Vec::new();
    for frequency in [Frequency::Weekly, Frequency::Monthly] {
        let name = frequency.title();
        println!("\n{}", "=".repeat(50));
        println!("ANALYZING {} DATA", name.to_uppercase());
        println!("{}", "=".repeat(50));

        let series = match SeriesBuilder::new().build(&london, ValueMode::Count, frequency) {
            Ok(series) => series,
            Err(e) => {
                error!(frequency = %frequency, error = %e, "could not build volume series");
                println!("Skipping {} analysis: {}", name.to_lowercase(), e);
                continue;
            }
        };

        let period = frequency.default_seasonal_period();
        if let (Some(first), Some(last)) = (series.timestamps().first(), series.last_timestamp()) {
            println!("Period: {} to {}", first.format("%Y-%m"), last.format("%Y-%m"));
        }
        println!("Data points: {}", series.len());
        println!("Seasonal period: {}", period);
        if let Ok(average) = price_math::mean(series.values()) {
            println!("Average transactions per period: {:.1}", average);
        }

        let title = format!("London {} Sales Volume", name);
        match charts.series(&series, &title, None) {
            Ok(path) => info!(path = %path.display(), "chart data written"),
            Err(e) => error!(error = %e, "could not write chart data"),
        }

        let candidates = custom
            .clone()
            .unwrap_or_else(|| presets::volume_candidates(period, name));
        let result = engine.compare(&series, &candidates);
        println!("\n{}", render_table(&result));
        comparisons.push((name.to_string(), result));
    }

    let summary = ComparisonReporter::new().summarize(&comparisons);
    println!("\n{}", "=".repeat(70));
    println!("FINAL SUMMARY");
    println!("{}", "=".repeat(70));
    println!("{}", summary);

    if let Some(path) = &args.summary_json {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!(path = %path.display(), "summary written");
    }

    Ok(())
}
