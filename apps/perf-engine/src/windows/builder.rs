//! Builders for evaluation windows and sample slices.

use rand::Rng;
use tracing::debug;

use super::types::{SampleSlice, SplitRanges, WindowSpec};
use crate::dates::{DateIndex, DateRangeQuery};
use crate::error::{PerfError, RangeSide, Result};

const FRACTION_TOLERANCE: f64 = 1e-4;

/// One window per lookback, each covering the last `n` rows of `index`.
///
/// Each window is a resolver query with `end = index.last()` and
/// `offset = n - 1`, labelled `period-{n}`. A lookback longer than the
/// index fails later, when the query is resolved.
///
/// # Errors
///
/// `Shape` for a lookback under 2 rows, `Value` for a repeated lookback.
pub fn lookback_windows(index: &DateIndex, lookbacks: &[usize]) -> Result<Vec<WindowSpec>> {
    let mut windows: Vec<WindowSpec> = Vec::with_capacity(lookbacks.len());
    for &n in lookbacks {
        if n < 2 {
            return Err(PerfError::shape(format!(
                "lookback {n} must cover at least 2 rows"
            )));
        }
        let label = format!("period-{n}");
        if windows.iter().any(|w| w.label == label) {
            return Err(PerfError::value("lookbacks", format!("{n} is repeated")));
        }
        let query = DateRangeQuery::new(None, Some(index.last()), Some((n - 1) as i64))?;
        windows.push(WindowSpec::new(label, query));
    }
    Ok(windows)
}

/// Split `len` rows into consecutive train, validation and test ranges.
///
/// Train and validation sizes are `round(len * fraction)`; test takes the
/// remaining rows.
///
/// # Errors
///
/// `Value` when a fraction is negative or the three do not sum to 1.
pub fn split_fractions(len: usize, train: f64, validation: f64, test: f64) -> Result<SplitRanges> {
    if [train, validation, test].iter().any(|f| !(0.0..=1.0).contains(f)) {
        return Err(PerfError::value(
            "fractions",
            format!("train({train}), validation({validation}), test({test}) must lie in [0, 1]"),
        ));
    }
    let sum = train + validation + test;
    if (sum - 1.0).abs() > FRACTION_TOLERANCE {
        return Err(PerfError::value(
            "fractions",
            format!("train({train}) + validation({validation}) + test({test}) must sum to 1"),
        ));
    }

    let n_train = ((len as f64 * train).round() as usize).min(len);
    let n_val = ((len as f64 * validation).round() as usize).min(len - n_train);

    Ok(SplitRanges {
        train: 0..n_train,
        validation: n_train..n_train + n_val,
        test: n_train + n_val..len,
    })
}

/// Draw `n_samples` random train/eval slices that fit inside `len` rows.
///
/// Each slice has `lookback` training rows followed by `eval` evaluation rows.
///
/// # Errors
///
/// `Shape` when `lookback + eval` exceeds `len`.
pub fn random_slices<R: Rng>(
    len: usize,
    n_samples: usize,
    lookback: usize,
    eval: usize,
    rng: &mut R,
) -> Result<Vec<SampleSlice>> {
    let total = lookback + eval;
    if total > len {
        return Err(PerfError::shape(format!(
            "lookback({lookback}) + eval({eval}) = {total} must be <= {len} rows"
        )));
    }

    let slices: Vec<SampleSlice> = (0..n_samples)
        .map(|_| {
            let end_train = rng.random_range(lookback..=len - eval);
            SampleSlice {
                start_train: end_train - lookback,
                end_train,
                end_eval: end_train + eval,
            }
        })
        .collect();

    debug!(n_samples, lookback, eval, len, "Drew random sample slices");
    Ok(slices)
}

/// Train and eval windows of each sample slice, positioned on `index`.
///
/// Slice `i` yields `sample-{i}-train` and `sample-{i}-eval`, each a
/// start-plus-offset query so the evaluator resolves it like any other window.
///
/// # Errors
///
/// `Range` when a slice starts past the end of `index`, `Value` for an
/// empty train or eval part.
pub fn sample_windows(index: &DateIndex, slices: &[SampleSlice]) -> Result<Vec<WindowSpec>> {
    let mut windows = Vec::with_capacity(slices.len() * 2);
    for (i, slice) in slices.iter().enumerate() {
        for (part, rows) in [("train", slice.train()), ("eval", slice.eval())] {
            let label = format!("sample-{i}-{part}");
            let start = index.get(rows.start).ok_or_else(|| {
                PerfError::range(
                    RangeSide::End,
                    rows.start + 1 - index.len(),
                    format!("{label} starts at row {}, index has {}", rows.start, index.len()),
                )
            })?;
            let Some(offset) = rows.len().checked_sub(1) else {
                return Err(PerfError::value(label, "sample part has no rows"));
            };
            let query = DateRangeQuery::new(Some(start), None, Some(offset as i64))?;
            windows.push(WindowSpec::new(label, query));
        }
    }
    Ok(windows)
}
