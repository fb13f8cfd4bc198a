//! Trading-calendar date handling.
//!
//! - `DateIndex`: ordered trading dates with pivot adjacency lookup
//! - `DateRangeQuery` / `resolve_range`: (start limit, end limit, offset)
//!   resolved to concrete, index-aligned start/end dates

mod calendar;
mod parse;
mod resolver;

pub use calendar::{DateIndex, PivotAdjacency};
pub use parse::{DATE_FORMAT, parse_date, parse_optional_date, validate_start_end};
pub use resolver::{DateRangeQuery, DateRangeResult, resolve_range};
