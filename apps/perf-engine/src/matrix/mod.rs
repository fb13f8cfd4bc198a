//! Close-price matrix keyed by trading date and symbol.
//!
//! Columns are stored contiguously (one `Vec<f64>` per symbol) because every
//! statistic is computed column by column. Missing values are `NaN`.

mod clean;
mod io;

pub use clean::{DropReport, FillReport};
pub use io::{load_close_csv, read_close_csv, write_close_csv};

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{DateIndex, DateRangeResult};
use crate::error::{PerfError, RangeSide, Result};

/// Daily close prices: rows are trading dates, columns are symbols.
///
/// Deserialization goes through [`PriceMatrix::new`]; missing closes are
/// written and read as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceMatrixRecord")]
pub struct PriceMatrix {
    index: DateIndex,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// Unvalidated wire form of a [`PriceMatrix`].
#[derive(Deserialize)]
struct PriceMatrixRecord {
    index: DateIndex,
    symbols: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl TryFrom<PriceMatrixRecord> for PriceMatrix {
    type Error = PerfError;

    fn try_from(record: PriceMatrixRecord) -> Result<Self> {
        let columns = record
            .columns
            .into_iter()
            .map(|c| c.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        Self::new(record.index, record.symbols, columns)
    }
}

impl PriceMatrix {
    /// Create a matrix from a date index, symbol names and one column per symbol.
    ///
    /// # Errors
    ///
    /// `Shape` when the column count differs from the symbol count or a
    /// column length differs from the index length, `Value` on duplicate symbols.
    pub fn new(index: DateIndex, symbols: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if symbols.len() != columns.len() {
            return Err(PerfError::shape(format!(
                "{} symbols but {} columns",
                symbols.len(),
                columns.len()
            )));
        }
        if let Some((symbol, column)) = symbols
            .iter()
            .zip(&columns)
            .find(|(_, c)| c.len() != index.len())
        {
            return Err(PerfError::shape(format!(
                "column '{symbol}' has {} rows, date index has {}",
                column.len(),
                index.len()
            )));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        if let Some(dup) = symbols.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(PerfError::value(dup.as_str(), "duplicate symbol"));
        }

        Ok(Self {
            index,
            symbols,
            columns,
        })
    }

    /// Date axis.
    #[must_use]
    pub const fn index(&self) -> &DateIndex {
        &self.index
    }

    /// Dates as a slice.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        self.index.as_slice()
    }

    /// Symbol names in column order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// All columns in symbol order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of rows (trading dates).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns (symbols).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.symbols.len()
    }

    /// Column position of a symbol.
    #[must_use]
    pub fn symbol_position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Close prices of one symbol.
    #[must_use]
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbol_position(symbol).map(|i| self.columns[i].as_slice())
    }

    /// Rows `start..=end` by position.
    ///
    /// # Errors
    ///
    /// Same as [`DateIndex::slice`].
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Self> {
        let index = self.index.slice(start, end)?;
        let columns = self
            .columns
            .iter()
            .map(|c| c[start..=end].to_vec())
            .collect();
        Ok(Self {
            index,
            symbols: self.symbols.clone(),
            columns,
        })
    }

    /// Rows between the resolved start and end dates, inclusive.
    ///
    /// The range may have been resolved against a different calendar (for
    /// example a reference symbol's listed dates), so rows are located by date.
    ///
    /// # Errors
    ///
    /// `Value` when either resolved date is not a row of this matrix.
    pub fn slice(&self, range: &DateRangeResult) -> Result<Self> {
        let locate = |date: NaiveDate| {
            self.index.position(date).ok_or_else(|| {
                PerfError::value("date", format!("{date} is not a row of the price matrix"))
            })
        };
        let start = locate(range.date_start)?;
        let end = locate(range.date_end)?;
        self.slice_rows(start, end)
    }

    /// The last `n` rows.
    ///
    /// # Errors
    ///
    /// `Shape` when `n` is 0 or larger than the row count.
    pub fn tail(&self, n: usize) -> Result<Self> {
        if n == 0 || n > self.n_rows() {
            return Err(PerfError::shape(format!(
                "tail({n}) on a matrix with {} rows",
                self.n_rows()
            )));
        }
        self.slice_rows(self.n_rows() - n, self.n_rows() - 1)
    }

    /// Close of `symbol` at the row `increment` positions after `date`.
    ///
    /// A negative increment looks backwards.
    ///
    /// # Errors
    ///
    /// `Value` for an unknown symbol or a date that is not a row, `Range`
    /// when the shifted position falls outside the matrix.
    pub fn close_at(&self, symbol: &str, date: NaiveDate, increment: i64) -> Result<f64> {
        let column = self
            .column(symbol)
            .ok_or_else(|| PerfError::value(symbol, "symbol not in price matrix"))?;
        let pos = self.index.position(date).ok_or_else(|| {
            PerfError::value("date", format!("{date} is not a row of the price matrix"))
        })?;

        let target = pos as i64 + increment;
        if target < 0 {
            return Err(PerfError::range(
                RangeSide::Start,
                target.unsigned_abs() as usize,
                format!("{date} shifted by {increment} rows is before the first row"),
            ));
        }
        let target = target as usize;
        let last = self.index.last_iloc();
        if target > last {
            return Err(PerfError::range(
                RangeSide::End,
                target - last,
                format!("{date} shifted by {increment} rows is after the last row"),
            ));
        }
        Ok(column[target])
    }

    /// Align the matrix to another calendar.
    ///
    /// Dates of `index` that are not rows here become `NaN` rows. Rows whose
    /// dates are not in `index` are dropped.
    #[must_use]
    pub fn reindex(&self, index: &DateIndex) -> Self {
        let positions: Vec<Option<usize>> = index.iter().map(|d| self.index.position(*d)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| positions.iter().map(|p| p.map_or(f64::NAN, |i| c[i])).collect())
            .collect();
        Self {
            index: index.clone(),
            symbols: self.symbols.clone(),
            columns,
        }
    }

    /// Dates on which `symbol` has a close.
    ///
    /// Used to build a calendar from a reference symbol.
    ///
    /// # Errors
    ///
    /// `Value` for an unknown symbol, `Shape` when the symbol has no closes.
    pub fn listed_dates(&self, symbol: &str) -> Result<DateIndex> {
        let column = self
            .column(symbol)
            .ok_or_else(|| PerfError::value(symbol, "symbol not in price matrix"))?;
        let dates = self
            .index
            .iter()
            .zip(column)
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, _)| *d)
            .collect::<Vec<_>>();
        if dates.is_empty() {
            return Err(PerfError::shape(format!("symbol '{symbol}' has no closes")));
        }
        DateIndex::new(dates)
    }

    /// Sub-matrix with the given symbols, in the given order.
    ///
    /// # Errors
    ///
    /// `Value` for an unknown or repeated symbol.
    pub fn select_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(symbols.len());
        let mut columns = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            let column = self
                .column(symbol)
                .ok_or_else(|| PerfError::value(symbol, "symbol not in price matrix"))?;
            names.push(symbol.to_string());
            columns.push(column.to_vec());
        }
        Self::new(self.index.clone(), names, columns)
    }
}
