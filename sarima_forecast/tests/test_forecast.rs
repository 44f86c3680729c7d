use approx::assert_abs_diff_eq;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sarima_forecast::chart::{ChartSink, CsvChartSink};
use sarima_forecast::diagnostics::diagnose;
use sarima_forecast::{
    AnalysisConfig, ForecastError, ForecastGenerator, Frequency, ModelFitter, ModelHandle, Order,
    SarimaFitter, SarimaModel, SeasonalOrder, TimeSeries,
};
use std::fs;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 36 monthly points ending 2024-12-31 with an upward drift
fn monthly_history() -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 2.0).unwrap();
    let mut level = 100.0;
    let values = (0..36)
        .map(|_| {
            level += 1.5 + noise.sample(&mut rng);
            level
        })
        .collect();
    TimeSeries::from_values(values, date(2022, 1, 1), Frequency::Monthly).unwrap()
}

fn fitted(series: &TimeSeries) -> SarimaModel {
    SarimaFitter::new()
        .fit(series.values(), Order::new(1, 1, 0), SeasonalOrder::none())
        .unwrap()
}

#[test]
fn test_monthly_forecast_continues_calendar() {
    let history = monthly_history();
    assert_eq!(history.last_timestamp(), Some(date(2024, 12, 31)));

    let model = fitted(&history);
    let forecast = ForecastGenerator::default()
        .forecast(&model, Some(12), date(2024, 12, 31), Frequency::Monthly, None)
        .unwrap();

    let expected = vec![
        date(2025, 1, 31),
        date(2025, 2, 28),
        date(2025, 3, 31),
        date(2025, 4, 30),
        date(2025, 5, 31),
        date(2025, 6, 30),
        date(2025, 7, 31),
        date(2025, 8, 31),
        date(2025, 9, 30),
        date(2025, 10, 31),
        date(2025, 11, 30),
        date(2025, 12, 31),
    ];
    assert_eq!(forecast.len(), 12);
    assert_eq!(forecast.points().timestamps(), expected.as_slice());
    assert_eq!(forecast.lower().timestamps(), expected.as_slice());
    assert_eq!(forecast.upper().timestamps(), expected.as_slice());
    assert_abs_diff_eq!(forecast.confidence_level(), 0.95);

    for row in forecast.rows() {
        assert!(row.lower <= row.point && row.point <= row.upper);
    }
    let widths: Vec<f64> = forecast.rows().iter().map(|r| r.upper - r.lower).collect();
    assert!(widths.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_default_horizon_and_configured_level() {
    let history = monthly_history();
    let model = fitted(&history);
    let config = AnalysisConfig {
        default_confidence_level: 0.8,
        ..AnalysisConfig::default()
    };
    let generator = ForecastGenerator::new(&config);

    let narrow = generator
        .forecast(&model, None, date(2024, 12, 31), Frequency::Monthly, None)
        .unwrap();
    let wide = generator
        .forecast(&model, None, date(2024, 12, 31), Frequency::Monthly, Some(0.99))
        .unwrap();

    assert_eq!(narrow.len(), 12);
    assert_abs_diff_eq!(narrow.confidence_level(), 0.8);
    let first_width = |f: &sarima_forecast::ForecastResult| f.upper().values()[0] - f.lower().values()[0];
    assert!(first_width(&wide) > first_width(&narrow));
    assert_eq!(narrow.points().values(), wide.points().values());
}

#[test]
fn test_invalid_forecast_requests() {
    let history = monthly_history();
    let model = fitted(&history);
    let generator = ForecastGenerator::default();
    let last = date(2024, 12, 31);

    assert!(matches!(
        generator.forecast(&model, Some(0), last, Frequency::Monthly, None),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        generator.forecast(&model, Some(3), last, Frequency::Monthly, Some(1.0)),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        generator.forecast(&model, Some(3), last, Frequency::Monthly, Some(-0.5)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_summary_and_json_output() {
    let history = monthly_history();
    let model = fitted(&history);
    let forecast = ForecastGenerator::default()
        .forecast(&model, Some(6), date(2024, 12, 31), Frequency::Monthly, None)
        .unwrap();

    let recent = history.tail(6);
    let summary = forecast.summary(recent.values()).unwrap();
    let expected = (summary.mean_forecast - summary.recent_mean) / summary.recent_mean * 100.0;
    assert_abs_diff_eq!(summary.change_pct, expected, epsilon = 1e-9);
    assert!(forecast.summary(&[]).is_err());

    let dir = tempdir().unwrap();
    let path = dir.path().join("outputs").join("forecast.json");
    forecast.write_json(&path).unwrap();
    let back: sarima_forecast::ForecastResult =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, forecast);
}

#[test]
fn test_diagnostics_match_handle() {
    let history = monthly_history();
    let model = fitted(&history);
    let diagnostics = diagnose(&model).unwrap();

    assert_abs_diff_eq!(diagnostics.aic, model.aic());
    assert_abs_diff_eq!(diagnostics.bic, model.bic());
    assert!(diagnostics.residual_min <= diagnostics.residual_mean);
    assert!(diagnostics.residual_mean <= diagnostics.residual_max);
    assert!(diagnostics.to_string().contains("AIC"));
}

#[test]
fn test_chart_sink_writes_forecast_rows() {
    let history = monthly_history();
    let model = fitted(&history);
    let forecast = ForecastGenerator::default()
        .forecast(&model, Some(4), date(2024, 12, 31), Frequency::Monthly, None)
        .unwrap();

    let dir = tempdir().unwrap();
    let sink = CsvChartSink::new(dir.path());
    let path = sink
        .forecast(&history, &forecast, "London Monthly Price Forecast", None)
        .unwrap();

    assert_eq!(
        path,
        dir.path()
            .join("outputs")
            .join("charts")
            .join("london_monthly_price_forecast.csv")
    );
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "timestamp,kind,value,lower,upper");
    assert_eq!(lines.len(), 1 + 36 + 4);
    assert!(lines[1].contains(",history,"));
    assert!(lines[37].starts_with("2025-01-31,forecast,"));
}

#[test]
fn test_weekly_default_horizon_continues_sundays() {
    let mut rng = StdRng::seed_from_u64(52);
    let noise = Normal::new(0.0, 5.0).unwrap();
    let values = (0..156)
        .map(|t| 400.0 + (t as f64 * 0.8) + noise.sample(&mut rng))
        .collect();
    let history = TimeSeries::from_values(values, date(2022, 1, 2), Frequency::Weekly).unwrap();
    let last = history.last_timestamp().unwrap();
    assert_eq!(last, date(2024, 12, 22));

    let forecast = ForecastGenerator::default()
        .forecast(&fitted(&history), None, last, Frequency::Weekly, None)
        .unwrap();

    assert_eq!(forecast.len(), 52);
    let stamps = forecast.points().timestamps();
    assert_eq!(stamps[0], date(2024, 12, 29));
    assert_eq!(stamps[51], date(2025, 12, 21));
    assert!(stamps.iter().all(|d| d.weekday() == chrono::Weekday::Sun));
    assert!(stamps.windows(2).all(|w| (w[1] - w[0]).num_days() == 7));
    assert_eq!(forecast.upper().frequency(), Frequency::Weekly);
}

#[test]
fn test_tampered_forecast_json_is_rejected() {
    let history = monthly_history();
    let forecast = ForecastGenerator::default()
        .forecast(&fitted(&history), Some(3), date(2024, 12, 31), Frequency::Monthly, None)
        .unwrap();

    let mut json = serde_json::to_value(&forecast).unwrap();
    json["lower"]["timestamps"] = serde_json::json!(["2025-03-31", "2025-02-28", "2025-01-31"]);
    let result: Result<sarima_forecast::ForecastResult, _> = serde_json::from_value(json);
    assert!(result.is_err());
}
