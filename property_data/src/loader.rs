//! Loading Price Paid transactions from raw and processed CSV files

use crate::cleaning::{clean_prices, MIN_REASONABLE_PRICE};
use crate::error::{DataError, Result};
use crate::postcode::postcode_area;
use crate::schema::{
    parse_new_build, parse_transfer_date, TableSchema, Transaction, TransactionTable,
};
use crate::source::{DatasetSource, ResolvedDataset};
use csv::{ReaderBuilder, StringRecord};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Column positions in the headerless Land Registry download
const RAW_PRICE: usize = 1;
const RAW_DATE: usize = 2;
const RAW_POSTCODE: usize = 3;
const RAW_PROPERTY_TYPE: usize = 4;
const RAW_NEW_BUILD: usize = 5;
const RAW_TENURE: usize = 6;
const RAW_CITY: usize = 11;

/// Reader for the raw, headerless Price Paid CSV files (`pp-YYYY.csv`)
#[derive(Debug)]
pub struct RawPricePaidReader;

impl RawPricePaidReader {
    /// Read a raw file, skipping malformed rows
    pub fn read<P: AsRef<Path>>(path: P) -> Result<TransactionTable> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let (table, skipped) = Self::parse(file)?;

        if skipped > 0 {
            warn!(path = %path.display(), skipped, "skipped malformed price paid rows");
        }
        info!(path = %path.display(), rows = table.len(), "loaded raw price paid records");

        Ok(table)
    }

    /// Parse raw records from any reader, returning the table and the
    /// number of rows that could not be parsed
    pub fn parse<R: Read>(reader: R) -> Result<(TransactionTable, usize)> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut skipped = 0;
        for record in csv_reader.records() {
            match Self::parse_record(&record?) {
                Ok(transaction) => rows.push(transaction),
                Err(_) => skipped += 1,
            }
        }

        Ok((
            TransactionTable::new(rows, TableSchema { has_city: true }),
            skipped,
        ))
    }

    fn parse_record(record: &StringRecord) -> Result<Transaction> {
        let field = |index: usize| {
            record
                .get(index)
                .ok_or_else(|| DataError::Parse(format!("Missing column {}", index)))
        };

        let price = field(RAW_PRICE)?
            .trim()
            .parse::<u64>()
            .map_err(|e| DataError::Parse(format!("Invalid price: {}", e)))?;
        let postcode = field(RAW_POSTCODE)?.trim().to_string();
        let area = postcode_area(&postcode)
            .ok_or_else(|| DataError::Parse(format!("Invalid postcode '{}'", postcode)))?;
        let city = record
            .get(RAW_CITY)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Transaction {
            price,
            date: parse_transfer_date(field(RAW_DATE)?)?,
            postcode,
            postcode_area: area,
            property_type: field(RAW_PROPERTY_TYPE)?.parse()?,
            new_build: parse_new_build(field(RAW_NEW_BUILD)?)?,
            tenure: field(RAW_TENURE)?.parse()?,
            city,
        })
    }
}

/// Loader for processed CSV files written by [`write_processed`]
#[derive(Debug)]
pub struct ProcessedLoader;

impl ProcessedLoader {
    /// Load a processed file with a header row
    pub fn load<P: AsRef<Path>>(path: P) -> Result<TransactionTable> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let table = Self::from_dataframe(&df)?;
        info!(path = %path.display(), rows = table.len(), "loaded processed properties");
        Ok(table)
    }

    /// Convert a DataFrame with the processed column layout
    pub fn from_dataframe(df: &DataFrame) -> Result<TransactionTable> {
        let column_names = df.get_column_names();
        let has_city = column_names.contains(&"City");
        let has_area = column_names.contains(&"Postcode_Area");

        let prices = Self::f64_column(df, "Price")?;
        let dates = Self::utf8_column(df, "Date")?;
        let postcodes = Self::utf8_column(df, "Postcode")?;
        let types = Self::utf8_column(df, "Property_Type")?;
        let new_build = Self::utf8_column(df, "New_built_indicator")?;
        let tenures = Self::utf8_column(df, "Tenure_Type")?;
        let cities = if has_city {
            Self::utf8_column(df, "City")?
        } else {
            vec![None; df.height()]
        };
        let areas = if has_area {
            Self::utf8_column(df, "Postcode_Area")?
        } else {
            vec![None; df.height()]
        };

        let mut rows = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for i in 0..df.height() {
            let parsed = (|| -> Result<Transaction> {
                let price = prices[i]
                    .filter(|p| *p >= 0.0)
                    .ok_or_else(|| DataError::Parse("Missing or negative price".to_string()))?;
                let postcode = postcodes[i].clone().unwrap_or_default();
                let area = areas[i]
                    .clone()
                    .or_else(|| postcode_area(&postcode))
                    .ok_or_else(|| DataError::Parse("No postcode area".to_string()))?;
                let text = |col: &[Option<String>], name: &str| {
                    col[i]
                        .clone()
                        .ok_or_else(|| DataError::Parse(format!("Missing {}", name)))
                };

                Ok(Transaction {
                    price: price.round() as u64,
                    date: parse_transfer_date(&text(&dates, "date")?)?,
                    postcode,
                    postcode_area: area,
                    property_type: text(&types, "property type")?.parse()?,
                    new_build: parse_new_build(&text(&new_build, "new-build indicator")?)?,
                    tenure: text(&tenures, "tenure")?.parse()?,
                    city: cities[i].clone().filter(|c| !c.is_empty()),
                })
            })();

            match parsed {
                Ok(transaction) => rows.push(transaction),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "skipped malformed processed rows");
        }

        Ok(TransactionTable::new(rows, TableSchema { has_city }))
    }

    fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name)
            .map_err(|_| DataError::Schema(format!("Column '{}' not found", name)))
    }

    fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let series = Self::require(df, name)?.cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    fn utf8_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
        let series = Self::require(df, name)?.cast(&DataType::Utf8)?;
        Ok(series
            .utf8()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct ProcessedRecord<'a> {
    #[serde(rename = "Price")]
    price: u64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Postcode")]
    postcode: &'a str,
    #[serde(rename = "Property_Type")]
    property_type: String,
    #[serde(rename = "New_built_indicator")]
    new_build: &'static str,
    #[serde(rename = "Tenure_Type")]
    tenure: String,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Postcode_Area")]
    postcode_area: &'a str,
}

/// Write a table in the processed column layout
pub fn write_processed<P: AsRef<Path>>(table: &TransactionTable, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for t in table.rows() {
        writer.serialize(ProcessedRecord {
            price: t.price,
            date: t.date.format("%Y-%m-%d").to_string(),
            postcode: &t.postcode,
            property_type: t.property_type.to_string(),
            new_build: if t.new_build { "Y" } else { "N" },
            tenure: t.tenure.code().to_string(),
            city: t.city.as_deref().unwrap_or(""),
            postcode_area: &t.postcode_area,
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = table.len(), "saved processed properties");
    Ok(())
}

/// Load and clean `data/raw/pp-{year}.csv` for each year under `data_root`
///
/// Missing years are skipped with a warning; it is an error only when no
/// year could be loaded.
pub fn load_multi_year<P: AsRef<Path>>(data_root: P, years: &[i32]) -> Result<TransactionTable> {
    let raw_dir = data_root.as_ref().join("data").join("raw");
    let mut combined = TransactionTable::default();
    let mut loaded_years = 0;

    for year in years {
        let path = raw_dir.join(format!("pp-{}.csv", year));
        if !path.exists() {
            warn!(path = %path.display(), "raw price paid file not found");
            continue;
        }

        let (cleaned, removed) = clean_prices(&RawPricePaidReader::read(&path)?, MIN_REASONABLE_PRICE);
        info!(year, rows = cleaned.len(), removed, "loaded properties");
        combined.extend(cleaned);
        loaded_years += 1;
    }

    if loaded_years == 0 {
        return Err(DataError::EmptyInput(format!(
            "No raw data files found in {}",
            raw_dir.display()
        )));
    }

    info!(rows = combined.len(), years = loaded_years, "combined multi-year properties");
    Ok(combined)
}

/// Load a resolved dataset, cleaning prices for real-world sources
pub fn load_dataset(resolved: &ResolvedDataset) -> Result<TransactionTable> {
    let table = ProcessedLoader::load(&resolved.path)?;

    match resolved.source {
        DatasetSource::Synthetic => Ok(table),
        _ => {
            let (cleaned, removed) = clean_prices(&table, MIN_REASONABLE_PRICE);
            if removed > 0 {
                info!(
                    removed,
                    floor = MIN_REASONABLE_PRICE,
                    "removed properties with unreasonably low prices"
                );
            }
            Ok(cleaned)
        }
    }
}
