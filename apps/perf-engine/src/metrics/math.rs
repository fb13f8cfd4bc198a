//! NaN-aware series math for performance statistics.
//!
//! Missing values are `NaN`. Reductions skip them; running accumulations
//! skip them and leave the missing position `NaN`.

use super::constants::TRADING_DAYS_PER_YEAR;

/// Mean of the non-missing values.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Standard deviation of the non-missing values with divisor `N - ddof`.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let count = values.iter().filter(|v| !v.is_nan()).count();
    if count <= ddof {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: f64 = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - avg) * (v - avg))
        .sum();
    Some((variance_sum / (count - ddof) as f64).sqrt())
}

/// Daily simple returns; the first row is 0.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return returns;
    }
    returns.push(0.0);
    returns.extend(prices.windows(2).map(|w| w[1] / w[0] - 1.0));
    returns
}

/// Running product of `1 + r`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    returns
        .iter()
        .map(|r| {
            if r.is_nan() {
                return f64::NAN;
            }
            acc *= 1.0 + r;
            acc
        })
        .collect()
}

/// Running maximum.
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|v| {
            if v.is_nan() {
                return f64::NAN;
            }
            peak = peak.max(*v);
            peak
        })
        .collect()
}

/// Drawdown from the running peak of a cumulative return curve.
pub fn drawdown(cumulative: &[f64]) -> Vec<f64> {
    cumulative
        .iter()
        .zip(running_max(cumulative))
        .map(|(c, peak)| c / peak - 1.0)
        .collect()
}

/// Minimum of the non-missing values, `NaN` if there are none.
pub fn nan_min(values: &[f64]) -> f64 {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .copied()
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Ulcer Index: root of the summed squared drawdowns over `rows`.
///
/// Missing drawdowns add nothing to the sum but still count toward `rows`.
pub fn ulcer_index(drawdown: &[f64], rows: usize) -> f64 {
    let sum_sq: f64 = drawdown
        .iter()
        .filter(|d| !d.is_nan())
        .map(|d| d * d)
        .sum();
    (sum_sq / rows as f64).sqrt()
}

/// Period length in years for a number of trading rows.
pub fn period_years(rows: usize) -> f64 {
    rows as f64 / TRADING_DAYS_PER_YEAR
}

/// Compound annual growth rate between two closes.
pub fn cagr(first: f64, last: f64, years: f64) -> f64 {
    (last / first).powf(1.0 / years) - 1.0
}
