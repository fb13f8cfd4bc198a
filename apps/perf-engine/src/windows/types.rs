//! Core types for window evaluation.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::dates::{DateRangeQuery, DateRangeResult};
use crate::metrics::{PerfStatsResult, Ratio, SymbolStats};

/// A named date-range query to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Window label, e.g. `period-30`.
    pub label: String,
    /// Range to resolve against the calendar.
    pub query: DateRangeQuery,
}

impl WindowSpec {
    /// Create a window spec.
    #[must_use]
    pub fn new(label: impl Into<String>, query: DateRangeQuery) -> Self {
        Self {
            label: label.into(),
            query,
        }
    }
}

/// Statistics of one evaluated window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    /// Window label.
    pub label: String,
    /// Resolved date range.
    pub range: DateRangeResult,
    /// Statistics over the rows of the range.
    pub stats: PerfStatsResult,
}

impl WindowStats {
    /// Symbols of this window sorted by `ratio`, best first.
    #[must_use]
    pub fn rank_by(&self, ratio: Ratio, top_n: Option<usize>) -> Vec<SymbolStats> {
        self.stats.rank_by(ratio, top_n)
    }

    /// Top symbol names for every ratio, in [`Ratio::ALL`] order.
    #[must_use]
    pub fn top_symbols(&self, top_n: usize) -> Vec<(Ratio, Vec<String>)> {
        Ratio::ALL
            .iter()
            .map(|ratio| {
                let names = self
                    .rank_by(*ratio, Some(top_n))
                    .into_iter()
                    .map(|s| s.symbol)
                    .collect();
                (*ratio, names)
            })
            .collect()
    }
}

/// Row positions of a train / evaluation sample.
///
/// Training rows are `start_train..end_train`, evaluation rows are
/// `end_train..end_eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleSlice {
    /// First training row.
    pub start_train: usize,
    /// One past the last training row; first evaluation row.
    pub end_train: usize,
    /// One past the last evaluation row.
    pub end_eval: usize,
}

impl SampleSlice {
    /// Training rows.
    #[must_use]
    pub const fn train(&self) -> Range<usize> {
        self.start_train..self.end_train
    }

    /// Evaluation rows.
    #[must_use]
    pub const fn eval(&self) -> Range<usize> {
        self.end_train..self.end_eval
    }
}

/// Consecutive train / validation / test row ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitRanges {
    /// Training rows.
    pub train: Range<usize>,
    /// Validation rows.
    pub validation: Range<usize>,
    /// Test rows (the remainder).
    pub test: Range<usize>,
}
