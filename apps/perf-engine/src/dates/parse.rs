//! Date string parsing and limit validation.

use chrono::NaiveDate;

use crate::error::{PerfError, Result};

/// Textual format accepted for every date limit.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `yyyy-mm-dd` date string.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        PerfError::value(
            "date",
            format!("{text} is an invalid date or not in this format: yyyy-mm-dd"),
        )
    })
}

/// Parse an optional date string, passing `None` through.
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<NaiveDate>> {
    text.map(parse_date).transpose()
}

/// Check that a start limit is strictly older than an end limit when both are set.
pub fn validate_start_end(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(PerfError::InvalidRange { start, end });
        }
    }
    Ok(())
}
