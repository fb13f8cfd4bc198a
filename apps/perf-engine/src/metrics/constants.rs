//! Constants for performance statistic calculations.

/// Trading days used to annualize a period.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const HUNDRED: f64 = 100.0;
pub const MIN_ROWS: usize = 2;
