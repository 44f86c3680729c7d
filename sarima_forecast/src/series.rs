//! Regularly spaced time series and their construction from transactions

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use property_data::TransactionTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Resampling granularity
///
/// Buckets are labelled with their last day: weeks end on Sunday, months
/// and quarters on their final calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
}

/// Last day of `month` in `year`
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Month-end `months` after the month containing `date`
fn shift_month_end(date: NaiveDate, months: usize) -> Option<NaiveDate> {
    let index = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    month_end(year, month)
}

impl Frequency {
    /// Label of the bucket containing `date`
    ///
    /// Idempotent. Saturates to `date` itself at the edge of the supported
    /// calendar.
    pub fn bucket_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Weekly => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_signed(Duration::days(to_sunday as i64))
                    .unwrap_or(date)
            }
            Frequency::Monthly => month_end(date.year(), date.month()).unwrap_or(date),
            Frequency::Quarterly => {
                let quarter_last_month = date.month0() / 3 * 3 + 3;
                month_end(date.year(), quarter_last_month).unwrap_or(date)
            }
        }
    }

    /// Bucket label `periods` steps after the bucket containing `date`
    pub fn advance(&self, date: NaiveDate, periods: usize) -> NaiveDate {
        let end = self.bucket_end(date);
        let shifted = match self {
            Frequency::Weekly => end.checked_add_signed(Duration::weeks(periods as i64)),
            Frequency::Monthly => shift_month_end(end, periods),
            Frequency::Quarterly => shift_month_end(end, periods * 3),
        };
        shifted.unwrap_or(end)
    }

    /// Seasonal period used when none is given: 52, 12 or 4
    pub fn default_seasonal_period(&self) -> usize {
        match self {
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }

    /// Forecast horizon used when none is given: one seasonal cycle
    pub fn default_horizon(&self) -> usize {
        self.default_seasonal_period()
    }

    /// Capitalised name for report headings
    pub fn title(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" | "w" | "w-sun" => Ok(Frequency::Weekly),
            "monthly" | "month" | "m" | "me" => Ok(Frequency::Monthly),
            "quarterly" | "quarter" | "q" | "qe" => Ok(Frequency::Quarterly),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown frequency '{}'",
                other
            ))),
        }
    }
}

/// How transactions in a bucket are reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    /// Mean sale price, empty buckets dropped
    Mean,
    /// Number of sales, empty buckets filled with zero
    Count,
}

/// Ordered `(timestamp, value)` pairs at a fixed frequency
///
/// Deserialisation goes through [`TimeSeries::new`], so decoded series
/// carry the same guarantees as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    timestamps: Vec<NaiveDate>,
    values: Vec<f64>,
    frequency: Frequency,
}

#[derive(Deserialize)]
struct RawTimeSeries {
    timestamps: Vec<NaiveDate>,
    values: Vec<f64>,
    frequency: Frequency,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = ForecastError;

    fn try_from(raw: RawTimeSeries) -> Result<Self> {
        Self::new(raw.timestamps, raw.values, raw.frequency)
    }
}

impl TimeSeries {
    /// Create a series, checking lengths match and timestamps strictly increase
    pub fn new(timestamps: Vec<NaiveDate>, values: Vec<f64>, frequency: Frequency) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(i) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ForecastError::ValidationError(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                timestamps[i],
                timestamps[i + 1]
            )));
        }

        Ok(Self {
            timestamps,
            values,
            frequency,
        })
    }

    /// Lay `values` out on consecutive buckets starting at the bucket of `start`
    pub fn from_values(values: Vec<f64>, start: NaiveDate, frequency: Frequency) -> Result<Self> {
        let first = frequency.bucket_end(start);
        let timestamps = (0..values.len())
            .map(|i| frequency.advance(first, i))
            .collect();
        Self::new(timestamps, values, frequency)
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the frequency
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last timestamp, if any
    pub fn last_timestamp(&self) -> Option<NaiveDate> {
        self.timestamps.last().copied()
    }

    /// Iterate over `(timestamp, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// `y[t] - y[t-1]`, one shorter than the series
    pub fn first_difference(&self) -> Vec<f64> {
        self.values.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// The last `n` observations (all of them if shorter)
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
            frequency: self.frequency,
        }
    }
}

/// Builds regular series out of transaction tables
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesBuilder;

impl SeriesBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self
    }

    /// Resample a table's sales into a series
    pub fn build(
        &self,
        table: &TransactionTable,
        mode: ValueMode,
        frequency: Frequency,
    ) -> Result<TimeSeries> {
        self.build_from_observations(table.price_observations(), mode, frequency)
    }

    /// Resample arbitrary `(date, value)` observations into a series
    pub fn build_from_observations<I>(
        &self,
        observations: I,
        mode: ValueMode,
        frequency: Frequency,
    ) -> Result<TimeSeries>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        let mut rows = 0usize;
        for (date, value) in observations {
            let entry = buckets.entry(frequency.bucket_end(date)).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
            rows += 1;
        }

        let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForecastError::EmptyInput(
                    "Cannot build a time series from zero rows".to_string(),
                ))
            }
        };

        let (timestamps, values): (Vec<NaiveDate>, Vec<f64>) = match mode {
            ValueMode::Mean => buckets
                .iter()
                .map(|(date, (sum, count))| (*date, sum / *count as f64))
                .unzip(),
            ValueMode::Count => {
                let mut timestamps = Vec::new();
                let mut values = Vec::new();
                let mut label = first;
                loop {
                    timestamps.push(label);
                    values.push(buckets.get(&label).map_or(0.0, |(_, count)| *count as f64));
                    let next = frequency.advance(label, 1);
                    if label >= last || next <= label {
                        break;
                    }
                    label = next;
                }
                (timestamps, values)
            }
        };

        debug!(rows, buckets = buckets.len(), "bucketed observations");
        info!(
            frequency = %frequency,
            mode = ?mode,
            points = values.len(),
            start = %first,
            end = %last,
            "built time series"
        );

        TimeSeries::new(timestamps, values, frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_bucket_ends_on_sunday() {
        // 2024-01-01 is a Monday
        assert_eq!(Frequency::Weekly.bucket_end(date(2024, 1, 1)), date(2024, 1, 7));
        assert_eq!(Frequency::Weekly.bucket_end(date(2024, 1, 7)), date(2024, 1, 7));
        assert_eq!(Frequency::Weekly.bucket_end(date(2024, 1, 8)), date(2024, 1, 14));
    }

    #[test]
    fn test_month_and_quarter_ends() {
        assert_eq!(Frequency::Monthly.bucket_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.bucket_end(date(2023, 12, 1)), date(2023, 12, 31));
        assert_eq!(Frequency::Quarterly.bucket_end(date(2024, 5, 3)), date(2024, 6, 30));
        assert_eq!(Frequency::Quarterly.bucket_end(date(2024, 11, 30)), date(2024, 12, 31));
    }

    #[test]
    fn test_advance_is_month_end_aware() {
        let jan = date(2024, 1, 31);
        assert_eq!(Frequency::Monthly.advance(jan, 1), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.advance(jan, 12), date(2025, 1, 31));
        assert_eq!(Frequency::Quarterly.advance(date(2024, 12, 31), 1), date(2025, 3, 31));
        assert_eq!(Frequency::Weekly.advance(date(2024, 1, 7), 2), date(2024, 1, 21));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("ME".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("daily".parse::<Frequency>().is_err());
        assert_eq!(Frequency::Quarterly.to_string(), "quarterly");
    }

    #[test]
    fn test_series_rejects_unordered_timestamps() {
        let result = TimeSeries::new(
            vec![date(2024, 1, 31), date(2024, 1, 31)],
            vec![1.0, 2.0],
            Frequency::Monthly,
        );
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));

        let result = TimeSeries::new(vec![date(2024, 1, 31)], vec![], Frequency::Monthly);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let series = TimeSeries::from_values(vec![1.0, 2.0], date(2024, 1, 1), Frequency::Monthly)
            .unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<TimeSeries>(&json).unwrap(), series);

        let unordered = r#"{"timestamps":["2024-02-29","2024-01-31"],"values":[1.0,2.0],"frequency":"monthly"}"#;
        let err = serde_json::from_str::<TimeSeries>(unordered).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));

        let mismatched = r#"{"timestamps":["2024-01-31"],"values":[1.0,2.0],"frequency":"monthly"}"#;
        let err = serde_json::from_str::<TimeSeries>(mismatched).unwrap_err();
        assert!(err.to_string().contains("doesn't match"));
    }

    #[test]
    fn test_count_mode_fills_gaps() {
        let observations = vec![
            (date(2024, 1, 5), 100.0),
            (date(2024, 1, 20), 300.0),
            (date(2024, 3, 2), 200.0),
        ];

        let counts = SeriesBuilder::new()
            .build_from_observations(observations.clone(), ValueMode::Count, Frequency::Monthly)
            .unwrap();
        assert_eq!(counts.values(), &[2.0, 0.0, 1.0]);
        assert_eq!(counts.timestamps()[1], date(2024, 2, 29));

        let means = SeriesBuilder::new()
            .build_from_observations(observations, ValueMode::Mean, Frequency::Monthly)
            .unwrap();
        assert_eq!(means.values(), &[200.0, 200.0]);
        assert_eq!(means.timestamps(), &[date(2024, 1, 31), date(2024, 3, 31)]);
    }

    #[test]
    fn test_empty_input() {
        let result = SeriesBuilder::new().build_from_observations(
            Vec::<(NaiveDate, f64)>::new(),
            ValueMode::Mean,
            Frequency::Weekly,
        );
        assert!(matches!(result, Err(ForecastError::EmptyInput(_))));
    }
}
