//! Descriptive report of a Price Paid dataset
//!
//! ```text
//! property-report --source real
//! property-report --generate 10000 --seed 42
//! property-report --process --years 2022,2023,2024
//! ```

use clap::Parser;
use property_data::analysis::{
    highest_value_area, inventory, london_stats, most_affordable_area, new_build_comparison,
    tenure_comparison,
};
use property_data::cleaning::sample;
use property_data::filters::{filter_by_areas, filter_central_london, filter_london};
use property_data::generator::generate_synthetic;
use property_data::loader::write_processed;
use property_data::source::SYNTHETIC_DATASET;
use property_data::{process_multi_year, process_real, TransactionTable};
use sarima_forecast::dataset::{load_table, DEFAULT_YEARS};
use sarima_forecast::{AnalysisConfig, TableRequest};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Descriptive analysis of Price Paid data")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processed dataset to load (auto, real, synthetic, sample, multi-year)
    #[arg(long, default_value = "auto")]
    source: String,

    /// Read raw yearly downloads instead of a processed dataset
    #[arg(long, value_delimiter = ',')]
    years: Vec<i32>,

    /// Restrict the report to these postcode areas
    #[arg(long, value_delimiter = ',')]
    areas: Vec<String>,

    /// Analyse a random sample of this many rows
    #[arg(long)]
    sample: Option<usize>,

    /// Seed for sampling and generation
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Write a synthetic dataset of this many rows and exit
    #[arg(long)]
    generate: Option<usize>,

    /// Convert raw yearly downloads into the processed datasets and exit
    #[arg(long)]
    process: bool,
}

fn print_section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(title.len()));
}

fn report(table: &TransactionTable) {
    print_section("Price extremes");
    match (most_affordable_area(table), highest_value_area(table)) {
        (Some(cheapest), Some(dearest)) => {
            println!("Most affordable area: {}", cheapest);
            println!("Highest value area: {}", dearest);
        }
        _ => println!("No areas to compare"),
    }

    print_section("Inventory");
    match inventory(table) {
        Some(inventory) => println!("{}", inventory),
        None => println!("No areas to compare"),
    }

    print_section("New builds");
    println!("{}", new_build_comparison(table));

    print_section("Tenure");
    println!("{}", tenure_comparison(table));

    for (title, subset) in [
        ("London", filter_london(table)),
        ("Central London", filter_central_london(table)),
    ] {
        print_section(title);
        match london_stats(&subset) {
            Ok(stats) => println!("{}", stats),
            Err(e) => println!("No {} transactions: {}", title, e),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AnalysisConfig::load(args.config.as_ref())?;

    if let Some(rows) = args.generate {
        let table = generate_synthetic(rows, args.seed);
        let path = config.data_root.join(SYNTHETIC_DATASET);
        write_processed(&table, &path)?;
        println!("Wrote {} synthetic transactions to {}", table.len(), path.display());
        return Ok(());
    }

    if args.process {
        let years = if args.years.is_empty() {
            DEFAULT_YEARS.to_vec()
        } else {
            args.years.clone()
        };
        let latest = years.iter().copied().max().unwrap_or(DEFAULT_YEARS[2]);

        let real = process_real(&config.data_root, latest)?;
        println!(
            "Processed {} transactions from {} ({} sampled)",
            real.rows, latest, real.sampled
        );
        let combined = process_multi_year(&config.data_root, &years)?;
        println!(
            "Processed {} multi-year transactions ({} sampled)",
            combined.rows, combined.sampled
        );
        return Ok(());
    }

    let request = if args.years.is_empty() {
        TableRequest::Dataset(args.source.parse()?)
    } else {
        TableRequest::Years(args.years.clone())
    };
    let mut table = load_table(&config.data_root, &request)?;

    if !args.areas.is_empty() {
        table = filter_by_areas(&table, &args.areas);
        if table.is_empty() {
            warn!(areas = ?args.areas, "no transactions in the requested areas");
        }
    }
    if let Some(n) = args.sample {
        table = sample(&table, n, args.seed);
        info!(rows = table.len(), seed = args.seed, "sampled transactions");
    }

    println!("PROPERTY PRICE REPORT");
    println!("{}", "=".repeat(50));
    println!("Transactions: {}", table.len());
    report(&table);

    Ok(())
}
