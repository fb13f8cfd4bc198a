//! Formatting utilities for performance statistics display.
//!
//! Non-finite values print as `inf`, `-inf` or `NaN` so degenerate ratios
//! stay visible in reports.

use super::constants::HUNDRED;

/// Format a fraction as a percentage string.
#[must_use]
pub fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * HUNDRED)
    } else {
        format_non_finite(value)
    }
}

/// Format a value with 2 decimal places.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        format_non_finite(value)
    }
}

/// Format a ratio with 3 decimal places.
#[must_use]
pub fn format_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        format_non_finite(value)
    }
}

fn format_non_finite(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}
