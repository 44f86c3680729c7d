//! Descriptive statistics over postcode areas
//!
//! All grouping is by postcode area. When the table carries a city column
//! the most common city for an area is attached for display.

use crate::error::{DataError, Result};
use crate::schema::{PropertyType, Tenure, Transaction, TransactionTable};
use price_math::{mean, median};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of tied areas listed before summarising the rest
const MAX_LISTED_TIES: usize = 3;

/// Format a pound amount with thousands separators and no pence
pub fn format_pounds(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-£{}", grouped)
    } else {
        format!("£{}", grouped)
    }
}

fn area_label(area: &str, city: Option<&str>) -> String {
    match city {
        Some(city) => format!("{} ({})", city, area),
        None => area.to_string(),
    }
}

/// Average price of an area together with its representative city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPrice {
    pub area: String,
    pub city: Option<String>,
    pub average_price: f64,
}

impl fmt::Display for AreaPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            area_label(&self.area, self.city.as_deref()),
            format_pounds(self.average_price)
        )
    }
}

/// Number of transactions recorded in an area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCount {
    pub area: String,
    pub city: Option<String>,
    pub count: usize,
}

/// Most and least stocked postcode areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// Area with the most transactions (first alphabetically on ties)
    pub most: AreaCount,
    /// Every area sharing the minimum count, alphabetical
    pub least: Vec<AreaCount>,
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Area with most choices: {} ({} properties)",
            area_label(&self.most.area, self.most.city.as_deref()),
            self.most.count
        )?;

        match self.least.as_slice() {
            [] => Ok(()),
            [single] => write!(
                f,
                "Area with least choices: {} ({} properties)",
                area_label(&single.area, single.city.as_deref()),
                single.count
            ),
            tied => {
                let mut listed = tied
                    .iter()
                    .take(MAX_LISTED_TIES)
                    .map(|a| area_label(&a.area, a.city.as_deref()))
                    .collect::<Vec<_>>()
                    .join(", ");
                if tied.len() > MAX_LISTED_TIES {
                    listed.push_str(&format!(" and {} others", tied.len() - MAX_LISTED_TIES));
                }
                write!(
                    f,
                    "Areas with least choices: {} ({} properties each)",
                    listed, tied[0].count
                )
            }
        }
    }
}

/// Average prices of new builds against existing stock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewBuildComparison {
    pub new_build: Option<f64>,
    pub existing: Option<f64>,
}

impl fmt::Display for NewBuildComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average price of new builds: {}", optional_pounds(self.new_build))?;
        write!(
            f,
            "Average price of existing properties: {}",
            optional_pounds(self.existing)
        )
    }
}

/// Average prices of freehold against leasehold properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TenureComparison {
    pub freehold: Option<f64>,
    pub leasehold: Option<f64>,
}

impl fmt::Display for TenureComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Average price of freehold properties: {}",
            optional_pounds(self.freehold)
        )?;
        write!(
            f,
            "Average price of leasehold properties: {}",
            optional_pounds(self.leasehold)
        )
    }
}

fn optional_pounds(value: Option<f64>) -> String {
    value.map(format_pounds).unwrap_or_else(|| "n/a".to_string())
}

/// Summary statistics for a (usually London-filtered) table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LondonStats {
    pub total_properties: usize,
    pub avg_price: f64,
    pub median_price: f64,
    pub min_price: u64,
    pub max_price: u64,
    pub property_type_counts: BTreeMap<PropertyType, usize>,
    pub postcode_areas: usize,
    pub avg_price_by_type: BTreeMap<PropertyType, f64>,
}

impl fmt::Display for LondonStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total properties: {}", self.total_properties)?;
        writeln!(f, "Average price: {}", format_pounds(self.avg_price))?;
        writeln!(f, "Median price: {}", format_pounds(self.median_price))?;
        writeln!(
            f,
            "Price range: {} - {}",
            format_pounds(self.min_price as f64),
            format_pounds(self.max_price as f64)
        )?;
        writeln!(f, "Postcode areas: {}", self.postcode_areas)?;
        for (property_type, count) in &self.property_type_counts {
            let average = self
                .avg_price_by_type
                .get(property_type)
                .copied()
                .map(format_pounds)
                .unwrap_or_default();
            writeln!(f, "  {}: {} properties, average {}", property_type, count, average)?;
        }
        Ok(())
    }
}

fn prices_by_area(table: &TransactionTable) -> BTreeMap<&str, Vec<f64>> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in table.rows() {
        grouped
            .entry(t.postcode_area.as_str())
            .or_default()
            .push(t.price as f64);
    }
    grouped
}

/// Mean price per postcode area, ordered by area
pub fn area_average_prices(table: &TransactionTable) -> BTreeMap<String, f64> {
    prices_by_area(table)
        .into_iter()
        .filter_map(|(area, prices)| mean(&prices).ok().map(|m| (area.to_string(), m)))
        .collect()
}

/// Most frequent city recorded for an area, alphabetical on ties
///
/// Returns `None` when the table has no city column or the area has no
/// city values.
pub fn representative_city(table: &TransactionTable, area: &str) -> Option<String> {
    if !table.schema().has_city {
        return None;
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in table.rows().iter().filter(|t| t.postcode_area == area) {
        if let Some(city) = t.city.as_deref() {
            *counts.entry(city).or_insert(0) += 1;
        }
    }

    // BTreeMap iterates alphabetically, so keeping the first maximum breaks ties
    let mut best: Option<(&str, usize)> = None;
    for (city, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((city, count));
        }
    }
    best.map(|(city, _)| city.to_string())
}

fn extreme_area<F>(table: &TransactionTable, better: F) -> Option<AreaPrice>
where
    F: Fn(f64, f64) -> bool,
{
    let mut chosen: Option<(String, f64)> = None;
    for (area, average) in area_average_prices(table) {
        if chosen.as_ref().map_or(true, |(_, best)| better(average, *best)) {
            chosen = Some((area, average));
        }
    }

    chosen.map(|(area, average_price)| AreaPrice {
        city: representative_city(table, &area),
        area,
        average_price,
    })
}

/// Area with the lowest average price
pub fn most_affordable_area(table: &TransactionTable) -> Option<AreaPrice> {
    extreme_area(table, |candidate, best| candidate < best)
}

/// Area with the highest average price
pub fn highest_value_area(table: &TransactionTable) -> Option<AreaPrice> {
    extreme_area(table, |candidate, best| candidate > best)
}

/// Most and least stocked areas, `None` for an empty table
pub fn inventory(table: &TransactionTable) -> Option<Inventory> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in table.rows() {
        *counts.entry(t.postcode_area.as_str()).or_insert(0) += 1;
    }

    let max = counts.values().copied().max()?;
    let min = counts.values().copied().min()?;

    let describe = |area: &str, count: usize| AreaCount {
        area: area.to_string(),
        city: representative_city(table, area),
        count,
    };

    let most = counts
        .iter()
        .find(|(_, &c)| c == max)
        .map(|(area, &c)| describe(area, c))?;
    let least = counts
        .iter()
        .filter(|(_, &c)| c == min)
        .map(|(area, &c)| describe(area, c))
        .collect();

    Some(Inventory { most, least })
}

fn average_where<F>(table: &TransactionTable, predicate: F) -> Option<f64>
where
    F: Fn(&Transaction) -> bool,
{
    let prices: Vec<f64> = table
        .rows()
        .iter()
        .filter(|t| predicate(t))
        .map(|t| t.price as f64)
        .collect();
    mean(&prices).ok()
}

/// Average price of new builds against existing properties
pub fn new_build_comparison(table: &TransactionTable) -> NewBuildComparison {
    NewBuildComparison {
        new_build: average_where(table, |t| t.new_build),
        existing: average_where(table, |t| !t.new_build),
    }
}

/// Average price of freehold against leasehold properties
pub fn tenure_comparison(table: &TransactionTable) -> TenureComparison {
    TenureComparison {
        freehold: average_where(table, |t| t.tenure == Tenure::Freehold),
        leasehold: average_where(table, |t| t.tenure == Tenure::Leasehold),
    }
}

/// Summary statistics of a table
pub fn london_stats(table: &TransactionTable) -> Result<LondonStats> {
    if table.is_empty() {
        return Err(DataError::EmptyInput(
            "Cannot summarise an empty table".to_string(),
        ));
    }

    let prices: Vec<f64> = table.rows().iter().map(|t| t.price as f64).collect();

    let mut by_type: BTreeMap<PropertyType, Vec<f64>> = BTreeMap::new();
    for t in table.rows() {
        by_type.entry(t.property_type).or_default().push(t.price as f64);
    }

    let mut avg_price_by_type = BTreeMap::new();
    for (property_type, values) in &by_type {
        avg_price_by_type.insert(*property_type, mean(values)?);
    }

    let postcode_areas = prices_by_area(table).len();

    Ok(LondonStats {
        total_properties: table.len(),
        avg_price: mean(&prices)?,
        median_price: median(&prices)?,
        min_price: table.rows().iter().map(|t| t.price).min().unwrap_or(0),
        max_price: table.rows().iter().map(|t| t.price).max().unwrap_or(0),
        property_type_counts: by_type.iter().map(|(k, v)| (*k, v.len())).collect(),
        postcode_areas,
        avg_price_by_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pounds() {
        assert_eq!(format_pounds(0.0), "£0");
        assert_eq!(format_pounds(950.4), "£950");
        assert_eq!(format_pounds(1_000.0), "£1,000");
        assert_eq!(format_pounds(1_234_567.6), "£1,234,568");
        assert_eq!(format_pounds(-45_000.0), "-£45,000");
    }
}
