//! Property tests for the performance statistics engine.
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use chrono::{Days, NaiveDate};
use perf_engine::metrics::std_dev;
use perf_engine::{DateIndex, PriceMatrix, compute_perf_stats};
use proptest::prelude::*;

fn daily_index(rows: usize) -> DateIndex {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    DateIndex::new((0..rows as u64).map(|i| start + Days::new(i)).collect()).unwrap()
}

fn matrix(columns: Vec<Vec<f64>>) -> PriceMatrix {
    let rows = columns[0].len();
    let symbols = (0..columns.len()).map(|i| format!("S{i}")).collect();
    PriceMatrix::new(daily_index(rows), symbols, columns).unwrap()
}

/// 1..4 columns of equal length, 2..120 rows, strictly positive prices.
fn price_columns() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..120, 1usize..4).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(1.0f64..1_000.0, rows), cols)
    })
}

fn bits(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits()).collect()
}

proptest! {
    #[test]
    fn drawdown_is_never_positive(columns in price_columns()) {
        let stats = compute_perf_stats(&matrix(columns)).unwrap();
        for (i, dd) in stats.drawdown.iter().enumerate() {
            prop_assert_eq!(dd[0], 0.0);
            prop_assert!(dd.iter().all(|d| *d <= 0.0));
            prop_assert!(stats.max_drawdown[i] <= 0.0);
            prop_assert!(stats.max_drawdown[i] > -1.0);
            prop_assert!(stats.ulcer_index[i] >= 0.0);
            prop_assert!(stats.ulcer_index[i] <= -stats.max_drawdown[i] + 1e-12);
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical(columns in price_columns()) {
        let m = matrix(columns);
        let a = compute_perf_stats(&m).unwrap();
        let b = compute_perf_stats(&m).unwrap();

        prop_assert_eq!(a.period_years.to_bits(), b.period_years.to_bits());
        prop_assert_eq!(bits(&a.return_std), bits(&b.return_std));
        prop_assert_eq!(bits(&a.max_drawdown), bits(&b.max_drawdown));
        prop_assert_eq!(bits(&a.ulcer_index), bits(&b.ulcer_index));
        prop_assert_eq!(bits(&a.cagr), bits(&b.cagr));
        prop_assert_eq!(bits(&a.cagr_ui), bits(&b.cagr_ui));
        prop_assert_eq!(bits(&a.cagr_std), bits(&b.cagr_std));
        prop_assert_eq!(bits(&a.std_ui), bits(&b.std_ui));
        for (x, y) in a.drawdown.iter().zip(&b.drawdown) {
            prop_assert_eq!(bits(x), bits(y));
        }
    }

    #[test]
    fn columns_do_not_influence_each_other(columns in price_columns()) {
        let all = compute_perf_stats(&matrix(columns.clone())).unwrap();
        for (i, column) in columns.into_iter().enumerate() {
            let alone = compute_perf_stats(&matrix(vec![column])).unwrap();
            prop_assert_eq!(all.cagr[i].to_bits(), alone.cagr[0].to_bits());
            prop_assert_eq!(all.ulcer_index[i].to_bits(), alone.ulcer_index[0].to_bits());
            prop_assert_eq!(bits(&all.drawdown[i]), bits(&alone.drawdown[0]));
        }
    }

    #[test]
    fn sample_over_population_std_is_sqrt_n_over_n_minus_one(
        values in prop::collection::vec(-0.2f64..0.2, 2..200)
    ) {
        let sample = std_dev(&values, 1).unwrap();
        let population = std_dev(&values, 0).unwrap();
        prop_assume!(population > 1e-9);

        let n = values.len() as f64;
        let expected = (n / (n - 1.0)).sqrt();
        prop_assert!((sample / population - expected).abs() < 1e-9);
    }

    #[test]
    fn return_std_uses_returns_after_the_first_row(
        prices in prop::collection::vec(1.0f64..1_000.0, 3..100)
    ) {
        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let stats = compute_perf_stats(&matrix(vec![prices])).unwrap();
        let expected = std_dev(&returns, 1).unwrap();
        prop_assert!((stats.return_std[0] - expected).abs() <= 1e-12 * expected.max(1.0));
    }
}

#[test]
fn strictly_increasing_column_never_draws_down() {
    let up: Vec<f64> = (0..50).map(|i| 10.0 + f64::from(i)).collect();
    let stats = compute_perf_stats(&matrix(vec![up])).unwrap();

    assert!(stats.drawdown[0].iter().all(|d| *d == 0.0));
    assert_eq!(stats.ulcer_index[0], 0.0);
    assert_eq!(stats.max_drawdown[0], 0.0);
    assert_eq!(stats.cagr_ui[0], f64::INFINITY);
    assert_eq!(stats.std_ui[0], f64::INFINITY);
    assert!(stats.cagr_std[0].is_finite());
}

#[test]
fn linear_doubling_over_one_year() {
    let prices: Vec<f64> = (0..252).map(|i| 100.0 + 100.0 * f64::from(i) / 251.0).collect();
    let stats = compute_perf_stats(&matrix(vec![prices])).unwrap();

    assert_eq!(stats.period_years, 1.0);
    assert!((stats.cagr[0] - 1.0).abs() < 1e-12);
}

#[test]
fn reference_series_matches_hand_computation() {
    let stats = compute_perf_stats(&matrix(vec![vec![100.0, 120.0, 90.0, 108.0]])).unwrap();

    let dd = &stats.drawdown[0];
    assert!((dd[2] + 0.25).abs() < 1e-12);
    assert!((dd[3] + 0.1).abs() < 1e-12);
    assert!((stats.max_drawdown[0] + 0.25).abs() < 1e-12);

    let ui = ((0.25f64.powi(2) + 0.1f64.powi(2)) / 4.0).sqrt();
    assert!((stats.ulcer_index[0] - ui).abs() < 1e-12);

    let years = 4.0 / 252.0;
    let cagr = 1.08f64.powf(1.0 / years) - 1.0;
    assert!((stats.cagr[0] / cagr - 1.0).abs() < 1e-9);
    assert!((stats.cagr_ui[0] / (cagr / ui) - 1.0).abs() < 1e-9);
}
