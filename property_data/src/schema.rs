//! Typed transaction records

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Property type code used by the Price Paid dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyType {
    /// D
    Detached,
    /// S
    SemiDetached,
    /// F
    Flat,
    /// T
    Terraced,
    /// O
    Other,
}

impl PropertyType {
    /// Single-letter dataset code
    pub fn code(&self) -> char {
        match self {
            PropertyType::Detached => 'D',
            PropertyType::SemiDetached => 'S',
            PropertyType::Flat => 'F',
            PropertyType::Terraced => 'T',
            PropertyType::Other => 'O',
        }
    }
}

impl FromStr for PropertyType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "D" => Ok(PropertyType::Detached),
            "S" => Ok(PropertyType::SemiDetached),
            "F" => Ok(PropertyType::Flat),
            "T" => Ok(PropertyType::Terraced),
            "O" => Ok(PropertyType::Other),
            other => Err(DataError::Parse(format!("Unknown property type '{}'", other))),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tenure (duration) of the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tenure {
    Freehold,
    Leasehold,
}

impl Tenure {
    /// Single-letter dataset code
    pub fn code(&self) -> char {
        match self {
            Tenure::Freehold => 'F',
            Tenure::Leasehold => 'L',
        }
    }
}

impl FromStr for Tenure {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "F" => Ok(Tenure::Freehold),
            "L" => Ok(Tenure::Leasehold),
            other => Err(DataError::Parse(format!("Unknown tenure '{}'", other))),
        }
    }
}

/// Parse the Y/N new-build indicator
pub fn parse_new_build(s: &str) -> Result<bool> {
    match s.trim() {
        "Y" => Ok(true),
        "N" => Ok(false),
        other => Err(DataError::Parse(format!(
            "Unknown new-build indicator '{}'",
            other
        ))),
    }
}

/// Parse a transfer date, ignoring any time-of-day suffix
pub fn parse_transfer_date(s: &str) -> Result<NaiveDate> {
    let date_part = s.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", s, e)))
}

/// A single cleaned property sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sale price in pounds
    pub price: u64,
    /// Date of transfer
    pub date: NaiveDate,
    /// Full postcode
    pub postcode: String,
    /// Outward area letters, e.g. "SW" or "E"
    pub postcode_area: String,
    /// Property type
    pub property_type: PropertyType,
    /// Whether the property was newly built
    pub new_build: bool,
    /// Freehold or leasehold
    pub tenure: Tenure,
    /// Town or city, when the source carries it
    pub city: Option<String>,
}

/// Optional columns present in a loaded table
///
/// Decided once at ingestion so analysis code never checks for columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSchema {
    /// Town/city column is populated
    pub has_city: bool,
}

/// A loaded set of transactions with its schema
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
    schema: TableSchema,
}

impl TransactionTable {
    /// Create a table from rows and the schema they were loaded with
    pub fn new(rows: Vec<Transaction>, schema: TableSchema) -> Self {
        Self { rows, schema }
    }

    /// Create a table and infer the city flag from the rows themselves
    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        let has_city = rows.iter().any(|t| t.city.is_some());
        Self {
            rows,
            schema: TableSchema { has_city },
        }
    }

    /// Get the rows
    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// Consume the table and return its rows
    pub fn into_rows(self) -> Vec<Transaction> {
        self.rows
    }

    /// Get the schema
    pub fn schema(&self) -> TableSchema {
        self.schema
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows matching the predicate, preserving the schema
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Transaction) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|t| predicate(t)).cloned().collect(),
            schema: self.schema,
        }
    }

    /// Append the rows of another table
    pub fn extend(&mut self, other: TransactionTable) {
        self.schema.has_city |= other.schema.has_city;
        self.rows.extend(other.rows);
    }

    /// `(date, price)` observations for time series construction
    pub fn price_observations(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|t| (t.date, t.price as f64)).collect()
    }
}
