//! Report output configuration.

use serde::{Deserialize, Serialize};

use crate::metrics::Ratio;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// CSV with a header row.
    Csv,
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: ReportFormat,
    /// Number of ranked symbols to print.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Ratio used for ranking.
    #[serde(default)]
    pub ratio: Ratio,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            top_n: default_top_n(),
            ratio: Ratio::default(),
        }
    }
}

const fn default_top_n() -> usize {
    20
}
