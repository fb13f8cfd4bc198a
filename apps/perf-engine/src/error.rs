//! Error types for the performance engine.
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `Shape` | Matrix or index is too small or inconsistently shaped |
//! | `Value` | Non-positive price, negative offset, malformed date, duplicate label |
//! | `InvalidRange` | Start limit is not strictly older than end limit |
//! | `Range` | Pivot or offset-derived position falls outside the index |
//! | `Io` / `Csv` | Close-price file could not be read or written |
//! | `Json` | A report could not be serialized |
//! | `ThreadPool` | The global rayon pool could not be configured |
//!
//! Degenerate numeric results (a zero Ulcer Index producing `inf`/`NaN`
//! ratios) are never errors.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PerfError>;

/// Which end of a date index a range violation happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSide {
    /// Before the first index entry.
    Start,
    /// After the last index entry.
    End,
}

impl fmt::Display for RangeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// Errors raised by the statistics engine, the date resolver and the data layer.
#[derive(Debug, Error)]
pub enum PerfError {
    /// Malformed or insufficient input shape.
    #[error("Shape error: {message}")]
    Shape {
        /// Description of the shape violation.
        message: String,
    },

    /// Invalid input value.
    #[error("Invalid value for '{field}': {message}")]
    Value {
        /// Field, symbol or parameter that carried the value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Start limit is not older than end limit.
    #[error("Invalid range: date_start {start} MUST be older than date_end {end}")]
    InvalidRange {
        /// Requested start limit.
        start: NaiveDate,
        /// Requested end limit.
        end: NaiveDate,
    },

    /// A pivot or offset-derived position fell outside the index span.
    #[error("Out of range at index {side} by {overflow}: {message}")]
    Range {
        /// Side of the index that overflowed.
        side: RangeSide,
        /// How far past the boundary the request went (positions or days).
        overflow: usize,
        /// Error message with the inputs that caused the overflow.
        message: String,
    },

    /// Failed to open or create a file.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to read or write CSV records.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to serialize a JSON report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Thread pool initialization failed.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },
}

impl PerfError {
    /// Build a [`PerfError::Shape`].
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Build a [`PerfError::Value`].
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Value {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a [`PerfError::Range`].
    pub fn range(side: RangeSide, overflow: usize, message: impl Into<String>) -> Self {
        Self::Range {
            side,
            overflow,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_names_side_and_overflow() {
        let err = PerfError::range(RangeSide::End, 3, "iloc_start + offset past last position");
        let msg = err.to_string();
        assert!(msg.contains("end"));
        assert!(msg.contains("by 3"));
    }

    #[test]
    fn test_invalid_range_message() {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(2021, 2, 1),
            NaiveDate::from_ymd_opt(2021, 1, 1),
        ) else {
            panic!("fixture dates are valid");
        };
        let err = PerfError::InvalidRange { start, end };
        assert_eq!(
            err.to_string(),
            "Invalid range: date_start 2021-02-01 MUST be older than date_end 2021-01-01"
        );
    }
}
