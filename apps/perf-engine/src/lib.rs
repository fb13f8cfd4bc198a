// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Perf Engine - Rust Core Library
//!
//! Vectorized performance statistics over a panel of daily closing prices.
//!
//! # Modules
//!
//! - **dates**: Trading calendar and date-range resolution
//!   - `DateIndex`: strictly increasing trading dates
//!   - `resolve_range`: start/end/offset limits to index positions
//!
//! - **matrix**: Close-price panel
//!   - `PriceMatrix`: dates x symbols, `NaN` for missing closes
//!   - Cleaning (`drop_all_nan`, `drop_nan_rows`, zero-row fill) and CSV I/O
//!
//! - **metrics**: Drawdown, Ulcer Index, CAGR and their ratios
//!   - `compute_perf_stats`: one pass over every symbol column
//!   - Moving-window variants for a single symbol
//!
//! - **windows**: Lookback windows evaluated in parallel with rayon
//!
//! - **report**: Table, CSV and JSON rendering
//!
//! - **config** / **telemetry**: YAML configuration and logging setup
//!
//! # Example
//!
//! ```rust,ignore
//! use perf_engine::{DateRangeQuery, Ratio, compute_perf_stats, load_close_csv, resolve_range};
//!
//! let matrix = load_close_csv("data/close.csv", "date")?;
//! let query = DateRangeQuery::parse(Some("2021-01-04"), None, Some(59))?;
//! let range = resolve_range(matrix.index(), &query)?;
//! let stats = compute_perf_stats(&matrix.slice(&range)?)?;
//! for row in stats.rank_by(Ratio::CagrUlcer, Some(10)) {
//!     println!("{} {:.3}", row.symbol, row.cagr_ui);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod dates;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod windows;

pub use dates::{DateIndex, DateRangeQuery, DateRangeResult, resolve_range};
pub use error::{PerfError, RangeSide, Result};
pub use matrix::{PriceMatrix, load_close_csv};
pub use metrics::{PerfStatsResult, Ratio, RollingStats, SymbolStats, compute_perf_stats};
pub use windows::{WindowEvaluator, WindowSpec, WindowStats};
