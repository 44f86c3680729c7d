use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sarima_forecast::stationarity::critical_values;
use sarima_forecast::{Frequency, StationarityChecker, SuggestedRanges, TimeSeries};

fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(50.0, 3.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn weekly(values: Vec<f64>) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
    TimeSeries::from_values(values, start, Frequency::Weekly).unwrap()
}

#[test]
fn test_check_is_deterministic() {
    let series = weekly(white_noise(156, 9));
    let checker = StationarityChecker::new();

    let first = checker.check(&series).unwrap();
    let second = checker.check(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_white_noise_is_stationary() {
    let series = weekly(white_noise(200, 21));
    let report = StationarityChecker::new().check(&series).unwrap();

    assert!(report.is_stationary);
    assert!(report.statistic < report.critical_values["10%"]);
    assert_eq!(report.critical_values, critical_values(report.n_obs));
    assert!(report.to_string().ends_with("Series is stationary"));
}

#[test]
fn test_recommendation_for_stationary_series() {
    let series = weekly(white_noise(120, 5));
    let recommendation = StationarityChecker::new().recommend(&series).unwrap();

    assert!(recommendation.original.is_stationary);
    assert_eq!(recommendation.d, 0);
    assert_eq!(recommendation.seasonal_d, 1);
    assert_eq!(recommendation.seasonal_period, 52);
}

#[test]
fn test_significance_controls_verdict() {
    let series = weekly(white_noise(80, 3));
    let strict = StationarityChecker::with_significance(1e-12).unwrap();
    let loose = StationarityChecker::with_significance(0.999).unwrap();

    let strict_report = strict.check(&series).unwrap();
    let loose_report = loose.check(&series).unwrap();
    assert_eq!(strict_report.statistic, loose_report.statistic);
    assert!(loose_report.is_stationary);
    assert_eq!(strict_report.is_stationary, strict_report.p_value <= 1e-12);
}

/// Levels of a random walk whose increments are AR(1) around `drift`
fn integrated_ar1(n: usize, phi: f64, drift: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut step = 0.0;
    let mut level = 1_000.0;
    (0..n)
        .map(|_| {
            step = phi * step + normal.sample(&mut rng);
            level += drift + step;
            level
        })
        .collect()
}

#[test]
fn test_random_walk_needs_first_difference() {
    let series = weekly(integrated_ar1(200, 0.0, 1.0, 17));
    let recommendation = StationarityChecker::new().recommend(&series).unwrap();

    assert!(!recommendation.original.is_stationary);
    assert!(recommendation.first_difference.is_stationary);
    assert!(recommendation.original.p_value > recommendation.first_difference.p_value);
    assert_eq!(recommendation.d, 1);
    assert_eq!(recommendation.seasonal_period, 52);
}

#[test]
fn test_parameter_guide_reads_ar1_increments() {
    let phi = 0.6;
    let series = weekly(integrated_ar1(600, phi, 0.0, 33));
    let guide = StationarityChecker::new().analyze_parameters(&series).unwrap();

    assert_eq!(guide.lags(), 52);
    assert_eq!(guide.n_obs, 599);
    assert_eq!(guide.pacf.len(), guide.acf.len());
    assert_eq!(guide.acf[0], 1.0);
    assert!((guide.acf[1] - phi).abs() < 0.1);
    assert!((guide.acf[2] - phi * phi).abs() < 0.12);
    assert!((guide.pacf[1] - phi).abs() < 0.1);
    for k in 2..=4 {
        assert!(guide.pacf[k].abs() < 0.15, "pacf[{}] = {}", k, guide.pacf[k]);
    }

    assert_eq!(guide.suggested_ranges, SuggestedRanges::default());
    assert_eq!(guide.suggested_ranges.p, vec![0, 1, 2]);
    assert_eq!(guide.suggested_ranges.seasonal_q, vec![0, 1]);
    assert!(guide.to_string().contains("Suggested ranges: p [0, 1, 2]"));
}

#[test]
fn test_monthly_guide_uses_shorter_correlogram() {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let series =
        TimeSeries::from_values(integrated_ar1(36, 0.3, 2.0, 4), start, Frequency::Monthly).unwrap();
    let guide = StationarityChecker::new().analyze_parameters(&series).unwrap();

    assert_eq!(guide.lags(), 11);
    assert_eq!(guide.differencing.seasonal_period, 12);
}
