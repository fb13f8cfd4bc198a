//! Performance statistics for close-price panels.
//!
//! Implements the drawdown-based metrics used to rank symbols:
//! - Drawdown from the running peak of the cumulative return curve
//! - Ulcer Index (root-mean-square drawdown)
//! - CAGR over the period, annualized with 252 trading days
//! - Ratios CAGR/UI, CAGR/Std and Std/UI, where larger is better
//! - Trailing moving-window versions of the above

mod calculator;
mod constants;
mod format;
mod math;
mod rolling;
mod types;

pub use calculator::compute_perf_stats;
pub use constants::TRADING_DAYS_PER_YEAR;
pub use format::{format_decimal, format_pct, format_ratio};
pub use math::std_dev;
pub use rolling::{
    RollingStats, cagr_moving_window, perf_stats_moving_window, ulcer_index_moving_window,
};
pub use types::{PerfStatsResult, Ratio, SymbolStats};
