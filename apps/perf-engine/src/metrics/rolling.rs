//! Trailing moving-window statistics for a single symbol.
//!
//! Every output has the input's length. The first `window - 1` positions
//! have no complete window and hold `NaN`.

use serde::Serialize;

use super::calculator::{column_stats, validate_column};
use super::math::{cagr, period_years};
use crate::error::{PerfError, Result};

/// Per-window statistics of one symbol, aligned to the input rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStats {
    /// Window length in rows.
    pub window: usize,
    /// Window length in years.
    pub period_years: f64,
    /// Compound annual growth rate.
    pub cagr: Vec<f64>,
    /// CAGR / return standard deviation.
    pub cagr_std: Vec<f64>,
    /// CAGR / Ulcer Index.
    pub cagr_ui: Vec<f64>,
    /// Sample standard deviation of daily returns.
    pub return_std: Vec<f64>,
    /// Return standard deviation / Ulcer Index.
    pub std_ui: Vec<f64>,
    /// Ulcer Index.
    pub ulcer_index: Vec<f64>,
    /// Maximum drawdown.
    pub max_drawdown: Vec<f64>,
}

/// Ulcer Index of each trailing window of a drawdown series.
///
/// A window containing a missing drawdown yields `NaN`.
///
/// # Errors
///
/// `Shape` when `window < 2` or `window > drawdown.len()`.
pub fn ulcer_index_moving_window(drawdown: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(drawdown.len(), window)?;
    let values = drawdown
        .windows(window)
        .map(|w| (w.iter().map(|d| d * d).sum::<f64>() / window as f64).sqrt());
    Ok(nan_pad(drawdown.len(), window, values))
}

/// CAGR of each trailing window of a close series.
///
/// # Errors
///
/// `Shape` when `window < 2` or `window > close.len()`.
pub fn cagr_moving_window(close: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(close.len(), window)?;
    let years = period_years(window);
    let values = close
        .windows(window)
        .map(|w| cagr(w[0], w[window - 1], years));
    Ok(nan_pad(close.len(), window, values))
}

/// Full statistics of each trailing window of a close series.
///
/// # Errors
///
/// `Shape` for a bad window, `Value` for a non-positive or infinite close.
pub fn perf_stats_moving_window(close: &[f64], window: usize) -> Result<RollingStats> {
    check_window(close.len(), window)?;
    validate_column("close", close)?;

    let len = close.len();
    let pad = window - 1;
    let mut stats = RollingStats {
        window,
        period_years: period_years(window),
        cagr: vec![f64::NAN; pad],
        cagr_std: vec![f64::NAN; pad],
        cagr_ui: vec![f64::NAN; pad],
        return_std: vec![f64::NAN; pad],
        std_ui: vec![f64::NAN; pad],
        ulcer_index: vec![f64::NAN; pad],
        max_drawdown: vec![f64::NAN; pad],
    };

    for w in close.windows(window) {
        let s = column_stats(w);
        stats.cagr.push(s.cagr);
        stats.cagr_std.push(s.cagr_std);
        stats.cagr_ui.push(s.cagr_ui);
        stats.return_std.push(s.return_std);
        stats.std_ui.push(s.std_ui);
        stats.ulcer_index.push(s.ulcer_index);
        stats.max_drawdown.push(s.max_drawdown);
    }
    debug_assert_eq!(stats.cagr.len(), len);

    Ok(stats)
}

fn check_window(len: usize, window: usize) -> Result<()> {
    if window < 2 || window > len {
        return Err(PerfError::shape(format!(
            "moving window {window} must be between 2 and the series length {len}"
        )));
    }
    Ok(())
}

fn nan_pad(len: usize, window: usize, values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(len);
    out.resize(window - 1, f64::NAN);
    out.extend(values);
    out
}
