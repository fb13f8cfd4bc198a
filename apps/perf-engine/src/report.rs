//! Report rendering for ranked statistics, resolved ranges, window
//! evaluations and moving-window series.
//!
//! Every renderer returns the full report as a `String` in the requested
//! [`ReportFormat`]. JSON output encodes non-finite numbers as `null`;
//! table and CSV output print them as `NaN`, `inf` or `-inf`.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ReportFormat;
use crate::dates::DateRangeResult;
use crate::error::{PerfError, Result};
use crate::metrics::{RollingStats, Ratio, SymbolStats, format_decimal, format_pct, format_ratio};
use crate::windows::WindowStats;

const STATS_HEADER: [&str; 11] = [
    "Symbol", "First", "Last", "Years", "CAGR", "UI", "Std/UI", "CAGR/Std", "CAGR/UI", "MaxDD",
    "Std",
];

const ROLLING_HEADER: [&str; 8] = [
    "date",
    "cagr",
    "cagr_std",
    "cagr_ui",
    "return_std",
    "std_ui",
    "ulcer_index",
    "max_drawdown",
];

/// Render per-symbol statistics, one row per symbol, in the given order.
///
/// # Errors
///
/// Returns an error if CSV or JSON serialization fails.
pub fn render_stats(stats: &[SymbolStats], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => {
            let rows: Vec<Vec<String>> = stats
                .iter()
                .map(|s| {
                    vec![
                        s.symbol.clone(),
                        s.first_date.to_string(),
                        s.last_date.to_string(),
                        format_decimal(s.years),
                        format_pct(s.cagr),
                        format_ratio(s.ulcer_index),
                        format_ratio(s.std_ui),
                        format_ratio(s.cagr_std),
                        format_ratio(s.cagr_ui),
                        format_pct(s.max_drawdown),
                        format_ratio(s.return_std),
                    ]
                })
                .collect();
            Ok(render_table(&STATS_HEADER, &rows))
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in stats {
                writer.serialize(row)?;
            }
            finish_csv(writer)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
    }
}

/// Render a resolved date range.
///
/// # Errors
///
/// Returns an error if CSV or JSON serialization fails.
pub fn render_range(range: &DateRangeResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => {
            let rows = vec![
                vec!["date_start".to_string(), range.date_start.to_string()],
                vec!["date_end".to_string(), range.date_end.to_string()],
                vec!["iloc_start".to_string(), range.iloc_start.to_string()],
                vec!["iloc_end".to_string(), range.iloc_end.to_string()],
                vec!["rows".to_string(), range.row_count().to_string()],
            ];
            Ok(render_table(&["Field", "Value"], &rows))
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.serialize(range)?;
            finish_csv(writer)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(range)?),
    }
}

/// Top symbols of one ratio within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatioRanking {
    /// Ranking ratio.
    pub ratio: Ratio,
    /// Symbols, best first.
    pub symbols: Vec<String>,
}

/// Condensed view of an evaluated window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSummary {
    /// Window label.
    pub label: String,
    /// Resolved start date.
    pub date_start: NaiveDate,
    /// Resolved end date.
    pub date_end: NaiveDate,
    /// Rows in the window.
    pub rows: usize,
    /// Top symbols for every ratio.
    pub rankings: Vec<RatioRanking>,
}

impl WindowSummary {
    /// Summarize a window, keeping `top_n` symbols per ratio.
    #[must_use]
    pub fn new(window: &WindowStats, top_n: usize) -> Self {
        Self {
            label: window.label.clone(),
            date_start: window.range.date_start,
            date_end: window.range.date_end,
            rows: window.range.row_count(),
            rankings: window
                .top_symbols(top_n)
                .into_iter()
                .map(|(ratio, symbols)| RatioRanking { ratio, symbols })
                .collect(),
        }
    }
}

/// Render evaluated windows with the `top_n` symbols of every ratio.
///
/// CSV output is long-form: one record per (window, ratio, rank).
///
/// # Errors
///
/// Returns an error if CSV or JSON serialization fails.
pub fn render_windows(windows: &[WindowStats], top_n: usize, format: ReportFormat) -> Result<String> {
    let summaries: Vec<WindowSummary> = windows
        .iter()
        .map(|w| WindowSummary::new(w, top_n))
        .collect();

    match format {
        ReportFormat::Table => {
            let mut header = vec!["Window", "Start", "End", "Rows"];
            header.extend(Ratio::ALL.iter().map(|r| r.label()));
            let rows: Vec<Vec<String>> = summaries
                .iter()
                .map(|s| {
                    let mut row = vec![
                        s.label.clone(),
                        s.date_start.to_string(),
                        s.date_end.to_string(),
                        s.rows.to_string(),
                    ];
                    row.extend(s.rankings.iter().map(|r| r.symbols.join(" ")));
                    row
                })
                .collect();
            Ok(render_table(&header, &rows))
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["label", "date_start", "date_end", "rows", "ratio", "rank", "symbol"])?;
            for summary in &summaries {
                for ranking in &summary.rankings {
                    for (rank, symbol) in ranking.symbols.iter().enumerate() {
                        writer.write_record([
                            summary.label.clone(),
                            summary.date_start.to_string(),
                            summary.date_end.to_string(),
                            summary.rows.to_string(),
                            ranking.ratio.label().to_string(),
                            (rank + 1).to_string(),
                            symbol.clone(),
                        ])?;
                    }
                }
            }
            finish_csv(writer)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&summaries)?),
    }
}

#[derive(Serialize)]
struct RollingReport<'a> {
    symbol: &'a str,
    dates: &'a [NaiveDate],
    #[serde(flatten)]
    stats: &'a RollingStats,
}

/// Render moving-window statistics of one symbol, one row per date.
///
/// # Errors
///
/// `Shape` if `dates` and the series differ in length, otherwise a
/// serialization error.
pub fn render_rolling(
    symbol: &str,
    dates: &[NaiveDate],
    stats: &RollingStats,
    format: ReportFormat,
) -> Result<String> {
    if dates.len() != stats.cagr.len() {
        return Err(PerfError::shape(format!(
            "{} dates for {} rolling rows",
            dates.len(),
            stats.cagr.len()
        )));
    }

    let series = [
        &stats.cagr,
        &stats.cagr_std,
        &stats.cagr_ui,
        &stats.return_std,
        &stats.std_ui,
        &stats.ulcer_index,
        &stats.max_drawdown,
    ];

    match format {
        ReportFormat::Table => {
            let rows: Vec<Vec<String>> = dates
                .iter()
                .enumerate()
                .map(|(i, date)| {
                    let mut row = vec![date.to_string()];
                    row.extend(series.iter().map(|s| format_ratio(s[i])));
                    row
                })
                .collect();
            let mut out = format!("{symbol} (window {} rows)\n", stats.window);
            out.push_str(&render_table(&ROLLING_HEADER, &rows));
            Ok(out)
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(ROLLING_HEADER)?;
            for (i, date) in dates.iter().enumerate() {
                let mut record = vec![date.to_string()];
                record.extend(series.iter().map(|s| s[i].to_string()));
                writer.write_record(&record)?;
            }
            finish_csv(writer)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&RollingReport {
            symbol,
            dates,
            stats,
        })?),
    }
}

/// Render an aligned text table. The first column is left-aligned, the
/// rest right-aligned.
fn render_table<H: AsRef<str>>(header: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = header.iter().map(AsRef::as_ref).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            let _ = write!(line, "{:<width$}", cell.as_ref());
        } else {
            let _ = write!(line, "  {:>width$}", cell.as_ref());
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| PerfError::Io {
        path: "<report>".to_string(),
        source: e.into_error(),
    })?;
    String::from_utf8(bytes).map_err(|e| PerfError::value("report", e.to_string()))
}
