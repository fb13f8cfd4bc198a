//! Performance statistics over a close-price matrix.

use chrono::NaiveDate;
use tracing::debug;

use super::constants::MIN_ROWS;
use super::math::{
    cagr, cumulative_returns, daily_returns, drawdown, nan_min, period_years, std_dev, ulcer_index,
};
use super::types::PerfStatsResult;
use crate::dates::DateIndex;
use crate::error::{PerfError, Result};
use crate::matrix::PriceMatrix;

/// Statistics of a single close-price column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnStats {
    pub return_std: f64,
    pub drawdown: Vec<f64>,
    pub max_drawdown: f64,
    pub ulcer_index: f64,
    pub cagr: f64,
    pub cagr_ui: f64,
    pub cagr_std: f64,
    pub std_ui: f64,
}

/// Compute drawdown, Ulcer Index, CAGR and the three ratios for every symbol.
///
/// Every column is processed independently over all rows of `matrix`. The
/// ratios are plain divisions: a symbol that never draws down has a zero
/// Ulcer Index, and its ratios come back as `inf` or `NaN`.
///
/// # Errors
///
/// `Shape` for fewer than two rows or no columns. `Value` when a column
/// holds a non-positive or infinite price, or has no positive price at all.
pub fn compute_perf_stats(matrix: &PriceMatrix) -> Result<PerfStatsResult> {
    let rows = matrix.n_rows();
    if rows < MIN_ROWS {
        return Err(PerfError::shape(format!(
            "price matrix needs at least {MIN_ROWS} rows, got {rows}"
        )));
    }
    if matrix.n_cols() == 0 {
        return Err(PerfError::shape("price matrix has no columns"));
    }
    for (symbol, column) in matrix.symbols().iter().zip(matrix.columns()) {
        validate_column(symbol, column)?;
    }

    let n = matrix.n_cols();
    let mut result = PerfStatsResult {
        index: matrix.index().clone(),
        symbols: matrix.symbols().to_vec(),
        first_close: Vec::with_capacity(n),
        last_close: Vec::with_capacity(n),
        period_years: period_years(rows),
        return_std: Vec::with_capacity(n),
        drawdown: Vec::with_capacity(n),
        max_drawdown: Vec::with_capacity(n),
        ulcer_index: Vec::with_capacity(n),
        cagr: Vec::with_capacity(n),
        cagr_ui: Vec::with_capacity(n),
        cagr_std: Vec::with_capacity(n),
        std_ui: Vec::with_capacity(n),
    };

    for (symbol, column) in matrix.symbols().iter().zip(matrix.columns()) {
        let (first, last) = close_span(matrix.index(), symbol, column)?;
        result.first_close.push(first);
        result.last_close.push(last);
        let stats = column_stats(column);
        result.return_std.push(stats.return_std);
        result.drawdown.push(stats.drawdown);
        result.max_drawdown.push(stats.max_drawdown);
        result.ulcer_index.push(stats.ulcer_index);
        result.cagr.push(stats.cagr);
        result.cagr_ui.push(stats.cagr_ui);
        result.cagr_std.push(stats.cagr_std);
        result.std_ui.push(stats.std_ui);
    }

    let degenerate = result.ulcer_index.iter().filter(|ui| **ui == 0.0).count();
    debug!(
        rows,
        symbols = n,
        period_years = result.period_years,
        zero_ulcer_index = degenerate,
        "Computed performance statistics"
    );

    Ok(result)
}

/// Statistics of one column, assumed already validated.
pub(crate) fn column_stats(prices: &[f64]) -> ColumnStats {
    let rows = prices.len();
    let returns = daily_returns(prices);
    // first row is a convention, not an observation
    let return_std = std_dev(&returns[1..], 1).unwrap_or(f64::NAN);

    let drawdown = drawdown(&cumulative_returns(&returns));
    let max_drawdown = nan_min(&drawdown);
    let ulcer_index = ulcer_index(&drawdown, rows);

    let cagr = cagr(prices[0], prices[rows - 1], period_years(rows));

    ColumnStats {
        return_std,
        max_drawdown,
        ulcer_index,
        cagr,
        cagr_ui: cagr / ulcer_index,
        cagr_std: cagr / return_std,
        std_ui: return_std / ulcer_index,
        drawdown,
    }
}

/// Dates of the first and last non-missing close of a column.
fn close_span(index: &DateIndex, symbol: &str, prices: &[f64]) -> Result<(NaiveDate, NaiveDate)> {
    let first = prices.iter().position(|p| !p.is_nan());
    let last = prices.iter().rposition(|p| !p.is_nan());
    match (first.and_then(|i| index.get(i)), last.and_then(|i| index.get(i))) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(PerfError::value(symbol, "column has no closes")),
    }
}

/// Reject prices that cannot be a close.
pub(crate) fn validate_column(symbol: &str, prices: &[f64]) -> Result<()> {
    if let Some((row, bad)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_nan() && (**p <= 0.0 || p.is_infinite()))
    {
        return Err(PerfError::value(
            symbol,
            format!("price {bad} at row {row} must be positive and finite"),
        ));
    }
    if !prices.iter().any(|p| *p > 0.0) {
        return Err(PerfError::value(symbol, "column has no positive prices"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateIndex;

    const NAN: f64 = f64::NAN;

    fn matrix(columns: Vec<Vec<f64>>) -> PriceMatrix {
        let rows = columns.first().map_or(0, Vec::len);
        let dates: Vec<String> = (0..rows)
            .map(|i| format!("2021-01-{:02}", i + 1))
            .collect();
        let index = DateIndex::parse(&dates).unwrap();
        let symbols = (0..columns.len()).map(|i| format!("S{i}")).collect();
        PriceMatrix::new(index, symbols, columns).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_reference_values() {
        let result = compute_perf_stats(&matrix(vec![vec![100.0, 120.0, 90.0, 108.0]])).unwrap();

        assert!(close(result.period_years, 4.0 / 252.0));
        assert!(close(result.return_std[0], 0.259_807_621_135_331_5));

        let dd = &result.drawdown[0];
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!(close(dd[2], -0.25));
        assert!(close(dd[3], -0.1));

        assert!(close(result.max_drawdown[0], -0.25));
        assert!(close(result.ulcer_index[0], (0.0725_f64 / 4.0).sqrt()));
        assert!(close(result.cagr[0], 1.08_f64.powi(63) - 1.0));
        assert!(close(
            result.cagr_ui[0],
            result.cagr[0] / result.ulcer_index[0]
        ));
        assert!(close(
            result.std_ui[0],
            result.return_std[0] / result.ulcer_index[0]
        ));
    }

    #[test]
    fn test_monotonic_column_is_degenerate_not_error() {
        let result = compute_perf_stats(&matrix(vec![vec![10.0, 11.0, 12.0, 13.0]])).unwrap();
        assert!(result.drawdown[0].iter().all(|d| *d == 0.0));
        assert_eq!(result.ulcer_index[0], 0.0);
        assert_eq!(result.cagr_ui[0], f64::INFINITY);
        assert_eq!(result.std_ui[0], f64::INFINITY);
    }

    #[test]
    fn test_flat_column_gives_nan_ratios() {
        let result = compute_perf_stats(&matrix(vec![vec![10.0; 5]])).unwrap();
        assert_eq!(result.cagr[0], 0.0);
        assert_eq!(result.return_std[0], 0.0);
        assert!(result.cagr_ui[0].is_nan());
        assert!(result.cagr_std[0].is_nan());
        assert!(result.std_ui[0].is_nan());
    }

    #[test]
    fn test_columns_are_independent() {
        let a = vec![100.0, 120.0, 90.0, 108.0];
        let b = vec![50.0, 49.0, 51.0, 53.0];
        let both = compute_perf_stats(&matrix(vec![a.clone(), b])).unwrap();
        let alone = compute_perf_stats(&matrix(vec![a])).unwrap();

        assert_eq!(both.drawdown[0], alone.drawdown[0]);
        assert_eq!(both.cagr_ui[0].to_bits(), alone.cagr_ui[0].to_bits());
        assert_eq!(both.symbols, vec!["S0".to_string(), "S1".to_string()]);
    }

    #[test]
    fn test_leading_and_trailing_missing() {
        let result =
            compute_perf_stats(&matrix(vec![vec![NAN, 100.0, 110.0, 99.0, NAN]])).unwrap();

        let dd = &result.drawdown[0];
        assert_eq!(dd[0], 0.0);
        assert!(dd[1].is_nan());
        assert_eq!(dd[2], 0.0);
        assert!(close(dd[3], -0.1));
        assert!(dd[4].is_nan());

        // std over the two observed returns
        assert!(close(result.return_std[0], std_dev(&[0.1, -0.1], 1).unwrap()));
        assert!(close(result.ulcer_index[0], (0.01_f64 / 5.0).sqrt()));
        assert!(result.cagr[0].is_nan());
        assert!(result.cagr_ui[0].is_nan());
    }

    #[test]
    fn test_symbol_dates_follow_its_own_closes() {
        let result = compute_perf_stats(&matrix(vec![
            vec![10.0, 11.0, 12.0, 13.0, 14.0],
            vec![NAN, NAN, 20.0, 21.0, NAN],
        ]))
        .unwrap();

        let full = result.get("S0").unwrap();
        assert_eq!(full.first_date.to_string(), "2021-01-01");
        assert_eq!(full.last_date.to_string(), "2021-01-05");

        let late = result.get("S1").unwrap();
        assert_eq!(late.first_date.to_string(), "2021-01-03");
        assert_eq!(late.last_date.to_string(), "2021-01-04");
    }

    #[test]
    fn test_shape_errors() {
        let index = DateIndex::parse(&["2021-01-04"]).unwrap();
        let one_row = PriceMatrix::new(index, vec!["A".into()], vec![vec![1.0]]).unwrap();
        assert!(matches!(
            compute_perf_stats(&one_row),
            Err(PerfError::Shape { .. })
        ));

        let index = DateIndex::parse(&["2021-01-04", "2021-01-05"]).unwrap();
        let no_cols = PriceMatrix::new(index, vec![], vec![]).unwrap();
        assert!(matches!(
            compute_perf_stats(&no_cols),
            Err(PerfError::Shape { .. })
        ));
    }

    #[test]
    fn test_value_errors() {
        for column in [
            vec![1.0, 0.0, 2.0],
            vec![1.0, -2.0, 2.0],
            vec![1.0, f64::INFINITY, 2.0],
            vec![NAN, NAN, NAN],
        ] {
            let Err(err) = compute_perf_stats(&matrix(vec![column.clone()])) else {
                panic!("{column:?} should be rejected");
            };
            assert!(matches!(err, PerfError::Value { .. }));
        }
    }
}
