//! Trading calendar (date index) and pivot adjacency.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parse::parse_date;
use crate::error::{PerfError, RangeSide, Result};

/// An ordered, strictly increasing, non-empty sequence of trading dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct DateIndex(Vec<NaiveDate>);

/// The two index entries bracketing a pivot date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotAdjacency {
    /// Newest index date that is older than or equal to the pivot.
    pub older: NaiveDate,
    /// Oldest index date that is younger than or equal to the pivot.
    pub younger: NaiveDate,
    /// Position of `older`.
    pub older_iloc: usize,
    /// Position of `younger`.
    pub younger_iloc: usize,
    /// Whether the pivot itself is an index entry.
    pub in_index: bool,
}

impl DateIndex {
    /// Create a date index.
    ///
    /// # Errors
    ///
    /// `Shape` when `dates` is empty, `Value` when dates are not strictly increasing.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.is_empty() {
            return Err(PerfError::shape("date index must contain at least one date"));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PerfError::value(
                "date_index",
                format!(
                    "dates must be strictly increasing, found {} followed by {}",
                    pair[0], pair[1]
                ),
            ));
        }
        Ok(Self(dates))
    }

    /// Create a date index from `yyyy-mm-dd` strings.
    pub fn parse<S: AsRef<str>>(dates: &[S]) -> Result<Self> {
        let parsed = dates
            .iter()
            .map(|d| parse_date(d.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed)
    }

    /// Number of dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; an index is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Oldest date.
    #[must_use]
    pub fn first(&self) -> NaiveDate {
        self.0[0]
    }

    /// Newest date.
    #[must_use]
    pub fn last(&self) -> NaiveDate {
        self.0[self.0.len() - 1]
    }

    /// Last valid position.
    #[must_use]
    pub fn last_iloc(&self) -> usize {
        self.0.len() - 1
    }

    /// Date at a position.
    #[must_use]
    pub fn get(&self, iloc: usize) -> Option<NaiveDate> {
        self.0.get(iloc).copied()
    }

    /// Position of a date that is exactly in the index.
    #[must_use]
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.0.binary_search(&date).ok()
    }

    /// Whether a date is exactly in the index.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_some()
    }

    /// Dates as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.0
    }

    /// Iterate over the dates.
    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.iter()
    }

    /// Sub-index covering positions `start..=end`.
    ///
    /// # Errors
    ///
    /// `Range` when `end` is past the last position, `Shape` when `start > end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if end > self.last_iloc() {
            return Err(PerfError::range(
                RangeSide::End,
                end - self.last_iloc(),
                format!("slice end {end} > last index position {}", self.last_iloc()),
            ));
        }
        if start > end {
            return Err(PerfError::shape(format!(
                "slice start {start} is after slice end {end}"
            )));
        }
        Ok(Self(self.0[start..=end].to_vec()))
    }

    /// Find the index entries adjacent to `pivot`.
    ///
    /// # Errors
    ///
    /// `Range` when the pivot is older than the first date or younger than the last.
    pub fn adjacent(&self, pivot: NaiveDate) -> Result<PivotAdjacency> {
        let first = self.first();
        let last = self.last();

        if pivot < first {
            let days = (first - pivot).num_days().unsigned_abs() as usize;
            return Err(PerfError::range(
                RangeSide::Start,
                days,
                format!("date_pivot {pivot} MUST BE YOUNGER than the first index date {first}"),
            ));
        }
        if pivot > last {
            let days = (pivot - last).num_days().unsigned_abs() as usize;
            return Err(PerfError::range(
                RangeSide::End,
                days,
                format!("date_pivot {pivot} MUST BE OLDER than the last index date {last}"),
            ));
        }

        // pivot is within [first, last], so both bounds land inside the index
        let older_iloc = self.0.partition_point(|d| *d <= pivot) - 1;
        let younger_iloc = self.0.partition_point(|d| *d < pivot);

        Ok(PivotAdjacency {
            older: self.0[older_iloc],
            younger: self.0[younger_iloc],
            older_iloc,
            younger_iloc,
            in_index: older_iloc == younger_iloc,
        })
    }
}

impl TryFrom<Vec<NaiveDate>> for DateIndex {
    type Error = PerfError;

    fn try_from(dates: Vec<NaiveDate>) -> Result<Self> {
        Self::new(dates)
    }
}

impl From<DateIndex> for Vec<NaiveDate> {
    fn from(index: DateIndex) -> Self {
        index.0
    }
}

impl<'a> IntoIterator for &'a DateIndex {
    type Item = &'a NaiveDate;
    type IntoIter = std::slice::Iter<'a, NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
