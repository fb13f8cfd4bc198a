//! Data, range and rolling-window configuration.

use serde::{Deserialize, Serialize};

use crate::dates::DateRangeQuery;
use crate::error::Result;

/// Close-price input and cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the close-price CSV.
    #[serde(default = "default_close_csv")]
    pub close_csv: String,
    /// Name of the date column in the CSV header.
    #[serde(default = "default_date_column")]
    pub date_column: String,
    /// Drop rows with more missing closes than this.
    #[serde(default)]
    pub max_nan_per_row: Option<usize>,
    /// Drop symbols with more missing closes than this.
    #[serde(default)]
    pub max_nan_per_column: Option<usize>,
    /// Symbol whose listed dates form the calendar (default: all matrix rows).
    #[serde(default)]
    pub reference_symbol: Option<String>,
    /// Replace all-zero rows with the previous row.
    #[serde(default)]
    pub fill_zero_rows: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            close_csv: default_close_csv(),
            date_column: default_date_column(),
            max_nan_per_row: None,
            max_nan_per_column: None,
            reference_symbol: None,
            fill_zero_rows: false,
        }
    }
}

/// Date range limits, kept as text until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Start limit, `yyyy-mm-dd`.
    #[serde(default)]
    pub start: Option<String>,
    /// End limit, `yyyy-mm-dd`.
    #[serde(default)]
    pub end: Option<String>,
    /// Row offset from the resolved limit.
    #[serde(default)]
    pub offset: Option<i64>,
}

impl RangeConfig {
    /// Build the resolver query.
    ///
    /// # Errors
    ///
    /// Same as [`DateRangeQuery::parse`].
    pub fn query(&self) -> Result<DateRangeQuery> {
        DateRangeQuery::parse(self.start.as_deref(), self.end.as_deref(), self.offset)
    }
}

/// Moving-window statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Window length in rows.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Symbol to analyse (default: the reference symbol).
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            symbol: None,
        }
    }
}

/// Train / validation / test split and random sample slices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Share of rows used for training.
    #[serde(default = "default_train")]
    pub train: f64,
    /// Share of rows used for validation.
    #[serde(default = "default_validation")]
    pub validation: f64,
    /// Share of rows used for testing.
    #[serde(default = "default_test")]
    pub test: f64,
    /// Number of random slices drawn from the training rows.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Training rows per slice.
    #[serde(default = "default_sample_lookback")]
    pub lookback: usize,
    /// Evaluation rows per slice, following the training rows.
    #[serde(default = "default_sample_eval")]
    pub eval: usize,
    /// RNG seed; unset draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            train: default_train(),
            validation: default_validation(),
            test: default_test(),
            samples: default_samples(),
            lookback: default_sample_lookback(),
            eval: default_sample_eval(),
            seed: None,
        }
    }
}

fn default_close_csv() -> String {
    "data/close.csv".to_string()
}

fn default_date_column() -> String {
    "date".to_string()
}

const fn default_window() -> usize {
    30
}

const fn default_train() -> f64 {
    0.7
}

const fn default_validation() -> f64 {
    0.15
}

const fn default_test() -> f64 {
    0.15
}

const fn default_samples() -> usize {
    10
}

const fn default_sample_lookback() -> usize {
    60
}

const fn default_sample_eval() -> usize {
    20
}
