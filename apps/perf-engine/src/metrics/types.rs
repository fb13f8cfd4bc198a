//! Core types for performance statistics.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::DateIndex;
use crate::error::PerfError;

/// Ratio used to rank symbols. Larger is better for every variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// CAGR / Ulcer Index.
    #[default]
    CagrUlcer,
    /// CAGR / return standard deviation.
    CagrStd,
    /// Return standard deviation / Ulcer Index.
    StdUlcer,
}

impl Ratio {
    /// All ratios, in report order.
    pub const ALL: [Self; 3] = [Self::CagrUlcer, Self::CagrStd, Self::StdUlcer];

    /// Value of this ratio for one symbol.
    #[must_use]
    pub const fn of(self, stats: &SymbolStats) -> f64 {
        match self {
            Self::CagrUlcer => stats.cagr_ui,
            Self::CagrStd => stats.cagr_std,
            Self::StdUlcer => stats.std_ui,
        }
    }

    /// Column label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CagrUlcer => "CAGR/UI",
            Self::CagrStd => "CAGR/Std",
            Self::StdUlcer => "Std/UI",
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ratio {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['/', '-'], "_").as_str() {
            "cagr_ui" | "cagr_ulcer" => Ok(Self::CagrUlcer),
            "cagr_std" => Ok(Self::CagrStd),
            "std_ui" | "std_ulcer" => Ok(Self::StdUlcer),
            _ => Err(PerfError::value(
                "ratio",
                format!("'{s}' is not one of cagr_ui, cagr_std, std_ui"),
            )),
        }
    }
}

/// Statistics for one symbol over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolStats {
    /// Symbol name.
    pub symbol: String,
    /// Date of the symbol's first close in the period.
    pub first_date: NaiveDate,
    /// Date of the symbol's last close in the period.
    pub last_date: NaiveDate,
    /// Period length in years (rows / 252).
    pub years: f64,
    /// Compound annual growth rate.
    pub cagr: f64,
    /// Ulcer Index.
    pub ulcer_index: f64,
    /// Return standard deviation / Ulcer Index.
    pub std_ui: f64,
    /// CAGR / return standard deviation.
    pub cagr_std: f64,
    /// CAGR / Ulcer Index.
    pub cagr_ui: f64,
    /// Maximum drawdown (<= 0).
    pub max_drawdown: f64,
    /// Sample standard deviation of daily returns.
    pub return_std: f64,
}

/// Output of one performance statistics run.
///
/// Per-symbol vectors are in input column order. `drawdown` holds one
/// series per symbol with one value per input row. Only
/// [`compute_perf_stats`](super::compute_perf_stats) builds one, so every
/// per-symbol vector has one entry per symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfStatsResult {
    /// Dates of the input rows.
    pub index: DateIndex,
    /// Symbols, in input column order.
    pub symbols: Vec<String>,
    /// Date of each symbol's first close.
    pub first_close: Vec<NaiveDate>,
    /// Date of each symbol's last close.
    pub last_close: Vec<NaiveDate>,
    /// Period length in years (rows / 252).
    pub period_years: f64,
    /// Sample standard deviation of daily returns.
    pub return_std: Vec<f64>,
    /// Drawdown series per symbol.
    pub drawdown: Vec<Vec<f64>>,
    /// Minimum drawdown per symbol.
    pub max_drawdown: Vec<f64>,
    /// Ulcer Index per symbol.
    pub ulcer_index: Vec<f64>,
    /// Compound annual growth rate per symbol.
    pub cagr: Vec<f64>,
    /// CAGR / Ulcer Index per symbol.
    pub cagr_ui: Vec<f64>,
    /// CAGR / return standard deviation per symbol.
    pub cagr_std: Vec<f64>,
    /// Return standard deviation / Ulcer Index per symbol.
    pub std_ui: Vec<f64>,
}

impl PerfStatsResult {
    /// Number of input rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of symbols.
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Drawdown series of one symbol.
    #[must_use]
    pub fn drawdown_of(&self, symbol: &str) -> Option<&[f64]> {
        self.position(symbol).map(|i| self.drawdown[i].as_slice())
    }

    /// Statistics of one symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<SymbolStats> {
        self.position(symbol).map(|i| self.stats_at(i))
    }

    /// One row per symbol, in input column order.
    #[must_use]
    pub fn symbol_stats(&self) -> Vec<SymbolStats> {
        (0..self.n_symbols()).map(|i| self.stats_at(i)).collect()
    }

    /// Symbols sorted by `ratio`, best first.
    ///
    /// Non-finite ratios (a zero Ulcer Index, a missing endpoint) are left
    /// out. Ties keep input column order. `top_n` caps the list length.
    #[must_use]
    pub fn rank_by(&self, ratio: Ratio, top_n: Option<usize>) -> Vec<SymbolStats> {
        let mut ranked: Vec<SymbolStats> = self
            .symbol_stats()
            .into_iter()
            .filter(|s| ratio.of(s).is_finite())
            .collect();
        ranked.sort_by(|a, b| ratio.of(b).total_cmp(&ratio.of(a)));
        if let Some(n) = top_n {
            ranked.truncate(n);
        }
        ranked
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    fn stats_at(&self, i: usize) -> SymbolStats {
        SymbolStats {
            symbol: self.symbols[i].clone(),
            first_date: self.first_close[i],
            last_date: self.last_close[i],
            years: self.period_years,
            cagr: self.cagr[i],
            ulcer_index: self.ulcer_index[i],
            std_ui: self.std_ui[i],
            cagr_std: self.cagr_std[i],
            cagr_ui: self.cagr_ui[i],
            max_drawdown: self.max_drawdown[i],
            return_std: self.return_std[i],
        }
    }
}
