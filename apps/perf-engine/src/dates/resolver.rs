//! Date-range resolution against a trading calendar.
//!
//! Order of precedence for the start and end dates:
//! 1. an explicit date limit, snapped to the index by pivot adjacency
//! 2. the offset, measured from the other (resolved) endpoint
//! 3. the first / last index entry
//!
//! | start | end  | offset | date_start           | date_end             |
//! |-------|------|--------|----------------------|----------------------|
//! | set   | set  | any    | younger-or-equal     | older-or-equal       |
//! | set   | none | set    | younger-or-equal     | start + offset       |
//! | set   | none | none   | younger-or-equal     | index[-1]            |
//! | none  | set  | set    | end - offset         | older-or-equal       |
//! | none  | set  | none   | index[0]             | older-or-equal       |
//! | none  | none | any    | index[0]             | index[-1]            |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::calendar::DateIndex;
use super::parse::{parse_optional_date, validate_start_end};
use crate::error::{PerfError, RangeSide, Result};

/// Start limit, end limit and offset for a range lookup.
///
/// Construction validates the offset sign and the limit order, so a query
/// that exists is always well-formed. Deserialization goes through
/// [`DateRangeQuery::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeQueryRecord")]
pub struct DateRangeQuery {
    start_limit: Option<NaiveDate>,
    end_limit: Option<NaiveDate>,
    offset: Option<usize>,
}

#[derive(Deserialize)]
struct DateRangeQueryRecord {
    start_limit: Option<NaiveDate>,
    end_limit: Option<NaiveDate>,
    offset: Option<i64>,
}

impl TryFrom<DateRangeQueryRecord> for DateRangeQuery {
    type Error = PerfError;

    fn try_from(record: DateRangeQueryRecord) -> Result<Self> {
        Self::new(record.start_limit, record.end_limit, record.offset)
    }
}

impl DateRangeQuery {
    /// Create a query.
    ///
    /// # Errors
    ///
    /// `Value` for a negative offset, `InvalidRange` when both limits are set
    /// and the start is not strictly older than the end.
    pub fn new(
        start_limit: Option<NaiveDate>,
        end_limit: Option<NaiveDate>,
        offset: Option<i64>,
    ) -> Result<Self> {
        let offset = match offset {
            Some(n) if n < 0 => {
                return Err(PerfError::value(
                    "offset",
                    format!("offset = {n}, it must be a non-negative integer or None"),
                ));
            }
            Some(n) => Some(n as usize),
            None => None,
        };
        validate_start_end(start_limit, end_limit)?;

        Ok(Self {
            start_limit,
            end_limit,
            offset,
        })
    }

    /// Create a query from `yyyy-mm-dd` strings.
    pub fn parse(start_limit: Option<&str>, end_limit: Option<&str>, offset: Option<i64>) -> Result<Self> {
        let start = parse_optional_date(start_limit)?;
        let end = parse_optional_date(end_limit)?;
        Self::new(start, end, offset)
    }

    /// Query covering the whole index.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start_limit: None,
            end_limit: None,
            offset: None,
        }
    }

    /// Start limit, if any.
    #[must_use]
    pub const fn start_limit(&self) -> Option<NaiveDate> {
        self.start_limit
    }

    /// End limit, if any.
    #[must_use]
    pub const fn end_limit(&self) -> Option<NaiveDate> {
        self.end_limit
    }

    /// Offset, if any.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        self.offset
    }
}

/// Resolved range: two index dates and their positions.
///
/// Only [`resolve_range`] produces one, so `iloc_start <= iloc_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRangeResult {
    /// Resolved start date (an index entry).
    pub date_start: NaiveDate,
    /// Resolved end date (an index entry).
    pub date_end: NaiveDate,
    /// Position of `date_start`.
    pub iloc_start: usize,
    /// Position of `date_end`.
    pub iloc_end: usize,
}

impl DateRangeResult {
    /// Number of index rows covered, inclusive of both ends.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.iloc_end - self.iloc_start + 1
    }
}

/// Which row of the precedence table was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    StartEnd,
    StartOffset,
    StartOnly,
    EndOffset,
    EndOnly,
    Full,
}

/// Resolve a query against a date index.
///
/// Both returned dates are index entries even when the limits are not.
///
/// # Errors
///
/// `Range` when a limit lies outside the index span, when an offset-derived
/// position overflows either end, or when both limits are set and no index
/// date lies between them.
pub fn resolve_range(index: &DateIndex, query: &DateRangeQuery) -> Result<DateRangeResult> {
    let (rule, iloc_start, iloc_end) = match (query.start_limit, query.end_limit, query.offset) {
        (Some(start), Some(end), _) => {
            let iloc_start = index.adjacent(start)?.younger_iloc;
            let iloc_end = index.adjacent(end)?.older_iloc;
            if iloc_start > iloc_end {
                return Err(PerfError::range(
                    RangeSide::End,
                    iloc_start - iloc_end,
                    format!("no index date between date_start_limit {start} and date_end_limit {end}"),
                ));
            }
            (Rule::StartEnd, iloc_start, iloc_end)
        }
        (Some(start), None, Some(offset)) => {
            let iloc_start = index.adjacent(start)?.younger_iloc;
            let iloc_end = iloc_start + offset;
            let last = index.last_iloc();
            if iloc_end > last {
                return Err(PerfError::range(
                    RangeSide::End,
                    iloc_end - last,
                    format!(
                        "iloc_start + offset > len(index) - 1\n\
                         iloc_start:     {iloc_start}\n\
                         offset:         {offset}\n\
                         len(index) - 1: {last}\n\
                         Change date_start_limit to an older date, or use a smaller offset"
                    ),
                ));
            }
            (Rule::StartOffset, iloc_start, iloc_end)
        }
        (Some(start), None, None) => {
            let iloc_start = index.adjacent(start)?.younger_iloc;
            (Rule::StartOnly, iloc_start, index.last_iloc())
        }
        (None, Some(end), Some(offset)) => {
            let iloc_end = index.adjacent(end)?.older_iloc;
            let Some(iloc_start) = iloc_end.checked_sub(offset) else {
                return Err(PerfError::range(
                    RangeSide::Start,
                    offset - iloc_end,
                    format!(
                        "iloc_start = iloc_end - offset < 0\n\
                         iloc_end: {iloc_end}\n\
                         offset:   {offset}\n\
                         Change date_end_limit to a later date, or use a smaller offset"
                    ),
                ));
            };
            (Rule::EndOffset, iloc_start, iloc_end)
        }
        (None, Some(end), None) => {
            let iloc_end = index.adjacent(end)?.older_iloc;
            (Rule::EndOnly, 0, iloc_end)
        }
        (None, None, _) => (Rule::Full, 0, index.last_iloc()),
    };

    let result = DateRangeResult {
        date_start: index.as_slice()[iloc_start],
        date_end: index.as_slice()[iloc_end],
        iloc_start,
        iloc_end,
    };

    debug!(
        rule = ?rule,
        start_limit = ?query.start_limit,
        end_limit = ?query.end_limit,
        offset = ?query.offset,
        date_start = %result.date_start,
        date_end = %result.date_end,
        iloc_start,
        iloc_end,
        "Resolved date range"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    fn index() -> DateIndex {
        // Mon 2021-01-04 .. Fri 2021-01-15, weekends skipped
        DateIndex::parse(&[
            "2021-01-04",
            "2021-01-05",
            "2021-01-06",
            "2021-01-07",
            "2021-01-08",
            "2021-01-11",
            "2021-01-12",
            "2021-01-13",
            "2021-01-14",
            "2021-01-15",
        ])
        .unwrap()
    }

    fn resolve(start: Option<&str>, end: Option<&str>, offset: Option<i64>) -> Result<DateRangeResult> {
        let query = DateRangeQuery::parse(start, end, offset)?;
        resolve_range(&index(), &query)
    }

    #[test]
    fn test_full_range() {
        let Ok(r) = resolve(None, None, None) else {
            panic!("full range should resolve");
        };
        assert_eq!((r.iloc_start, r.iloc_end), (0, 9));
        assert_eq!(r.date_start, parse_date("2021-01-04").unwrap());
        assert_eq!(r.date_end, parse_date("2021-01-15").unwrap());
        assert_eq!(r.row_count(), 10);
    }

    #[test]
    fn test_offset_alone_is_ignored() {
        let r = resolve(None, None, Some(3)).unwrap();
        assert_eq!((r.iloc_start, r.iloc_end), (0, 9));
    }

    #[test]
    fn test_limits_snap_inward() {
        // Saturday start snaps forward to Monday, Sunday end snaps back to Friday
        let r = resolve(Some("2021-01-09"), Some("2021-01-10"), None);
        assert!(matches!(r, Err(PerfError::Range { .. })));

        let r = resolve(Some("2021-01-09"), Some("2021-01-14"), Some(100)).unwrap();
        assert_eq!(r.date_start, parse_date("2021-01-11").unwrap());
        assert_eq!(r.date_end, parse_date("2021-01-14").unwrap());
        assert_eq!((r.iloc_start, r.iloc_end), (5, 8));
    }

    #[test]
    fn test_start_offset_overflow_reports_amount() {
        let Err(PerfError::Range { side, overflow, .. }) = resolve(Some("2021-01-12"), None, Some(5))
        else {
            panic!("start + offset past the end should fail");
        };
        assert_eq!(side, RangeSide::End);
        // iloc_start 6 + 5 = 11, last position 9
        assert_eq!(overflow, 2);
    }

    #[test]
    fn test_end_offset_underflow_reports_amount() {
        let Err(PerfError::Range { side, overflow, .. }) = resolve(None, Some("2021-01-06"), Some(4))
        else {
            panic!("end - offset before the start should fail");
        };
        assert_eq!(side, RangeSide::Start);
        assert_eq!(overflow, 2);
    }

    #[test]
    fn test_deserialize_validates_like_new() {
        let query = DateRangeQuery::parse(Some("2021-01-05"), None, Some(3)).unwrap();
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(serde_json::from_str::<DateRangeQuery>(&json).unwrap(), query);
        assert_eq!(
            serde_json::from_str::<DateRangeQuery>("{}").unwrap(),
            DateRangeQuery::full()
        );

        for bad in [
            r#"{"start_limit": "2021-01-08", "end_limit": "2021-01-05"}"#,
            r#"{"start_limit": "2021-01-08", "end_limit": "2021-01-08"}"#,
            r#"{"end_limit": "2021-01-08", "offset": -2}"#,
        ] {
            assert!(serde_json::from_str::<DateRangeQuery>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_negative_offset_rejected() {
        assert!(matches!(
            DateRangeQuery::new(None, None, Some(-1)),
            Err(PerfError::Value { .. })
        ));
    }
}
