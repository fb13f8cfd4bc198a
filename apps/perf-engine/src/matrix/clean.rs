//! Row and column cleaning for close-price matrices.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::PriceMatrix;
use crate::dates::DateIndex;
use crate::error::{PerfError, Result};

/// Rows and columns removed by a cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DropReport {
    /// Dates of dropped rows.
    pub dates: Vec<NaiveDate>,
    /// Symbols of dropped columns.
    pub symbols: Vec<String>,
}

impl DropReport {
    /// Whether nothing was dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.symbols.is_empty()
    }
}

/// Outcome of an all-zero row repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Rows replaced by the previous row.
    pub filled: Vec<NaiveDate>,
    /// All-zero rows left as they were (no previous row).
    pub unfilled: Vec<NaiveDate>,
}

impl PriceMatrix {
    /// Remove rows and columns in which every value is `NaN`.
    ///
    /// # Errors
    ///
    /// `Shape` when every row is `NaN`.
    pub fn drop_all_nan(&self) -> Result<(Self, DropReport)> {
        let (keep_cols, drop_cols) = self.partition_columns(|c| c.iter().all(|v| v.is_nan()));
        let (keep_rows, drop_rows) = self.partition_rows(|row| row.iter().all(|v| v.is_nan()));

        let report = DropReport {
            dates: drop_rows.iter().map(|&i| self.dates()[i]).collect(),
            symbols: drop_cols.iter().map(|&i| self.symbols[i].clone()).collect(),
        };
        if !report.is_empty() {
            debug!(
                rows = report.dates.len(),
                columns = report.symbols.len(),
                "Dropped all-NaN rows and columns"
            );
        }

        Ok((self.take(&keep_rows, &keep_cols)?, report))
    }

    /// Remove rows with more than `max_nan` missing values.
    ///
    /// # Errors
    ///
    /// `Shape` when every row is removed.
    pub fn drop_nan_rows(&self, max_nan: usize) -> Result<(Self, Vec<NaiveDate>)> {
        let (keep, drop) =
            self.partition_rows(|row| row.iter().filter(|v| v.is_nan()).count() > max_nan);
        let dropped: Vec<NaiveDate> = drop.iter().map(|&i| self.dates()[i]).collect();
        if !dropped.is_empty() {
            debug!(max_nan, rows = dropped.len(), "Dropped rows over NaN limit");
        }

        let all_cols: Vec<usize> = (0..self.n_cols()).collect();
        Ok((self.take(&keep, &all_cols)?, dropped))
    }

    /// Remove columns with more than `max_nan` missing values.
    #[must_use]
    pub fn drop_nan_columns(&self, max_nan: usize) -> (Self, Vec<String>) {
        let (keep, drop) =
            self.partition_columns(|c| c.iter().filter(|v| v.is_nan()).count() > max_nan);
        let dropped: Vec<String> = drop.iter().map(|&i| self.symbols[i].clone()).collect();
        if !dropped.is_empty() {
            debug!(max_nan, symbols = ?dropped, "Dropped columns over NaN limit");
        }

        let cleaned = Self {
            index: self.index.clone(),
            symbols: keep.iter().map(|&i| self.symbols[i].clone()).collect(),
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
        };
        (cleaned, dropped)
    }

    /// Replace rows where every value is exactly 0 with the previous row.
    ///
    /// Runs of zero rows are filled forward from the last good row. A zero
    /// row at position 0 has no predecessor and is left in place.
    #[must_use]
    pub fn fill_zero_rows_from_previous(&self) -> (Self, FillReport) {
        let mut filled = self.clone();
        let mut report = FillReport::default();
        if self.n_cols() == 0 {
            return (filled, report);
        }

        for row in 0..self.n_rows() {
            if !filled.columns.iter().all(|c| c[row] == 0.0) {
                continue;
            }
            let date = self.dates()[row];
            if row == 0 {
                report.unfilled.push(date);
                continue;
            }
            for column in &mut filled.columns {
                column[row] = column[row - 1];
            }
            report.filled.push(date);
        }

        if !report.unfilled.is_empty() {
            warn!(dates = ?report.unfilled, "All-zero rows without a previous row");
        }
        if !report.filled.is_empty() {
            debug!(rows = report.filled.len(), "Filled all-zero rows from previous row");
        }

        (filled, report)
    }

    fn partition_rows(&self, drop: impl Fn(&[f64]) -> bool) -> (Vec<usize>, Vec<usize>) {
        let mut row = Vec::with_capacity(self.n_cols());
        (0..self.n_rows()).partition(|&i| {
            row.clear();
            row.extend(self.columns.iter().map(|c| c[i]));
            !drop(&row)
        })
    }

    fn partition_columns(&self, drop: impl Fn(&[f64]) -> bool) -> (Vec<usize>, Vec<usize>) {
        (0..self.n_cols()).partition(|&i| !drop(&self.columns[i]))
    }

    fn take(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        if rows.is_empty() {
            return Err(PerfError::shape("cleaning removed every row"));
        }
        let index = DateIndex::new(rows.iter().map(|&i| self.dates()[i]).collect())?;
        Ok(Self {
            index,
            symbols: cols.iter().map(|&i| self.symbols[i].clone()).collect(),
            columns: cols
                .iter()
                .map(|&c| rows.iter().map(|&r| self.columns[c][r]).collect())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    const NAN: f64 = f64::NAN;

    fn matrix(columns: Vec<Vec<f64>>) -> PriceMatrix {
        let index = DateIndex::parse(&[
            "2021-01-04",
            "2021-01-05",
            "2021-01-06",
            "2021-01-07",
        ])
        .unwrap();
        let symbols = (0..columns.len()).map(|i| format!("S{i}")).collect();
        PriceMatrix::new(index, symbols, columns).unwrap()
    }

    #[test]
    fn test_drop_all_nan() {
        let m = matrix(vec![
            vec![NAN, 1.0, NAN, 2.0],
            vec![NAN, NAN, NAN, NAN],
            vec![NAN, 3.0, 4.0, NAN],
        ]);
        let Ok((cleaned, report)) = m.drop_all_nan() else {
            panic!("some rows survive");
        };
        assert_eq!(report.symbols, vec!["S1".to_string()]);
        assert_eq!(report.dates, vec![parse_date("2021-01-04").unwrap()]);
        assert_eq!(cleaned.n_rows(), 3);
        assert_eq!(cleaned.symbols(), &["S0".to_string(), "S2".to_string()]);
        assert_eq!(cleaned.column("S2").unwrap()[1], 4.0);
    }

    #[test]
    fn test_drop_all_nan_everything_missing() {
        let m = matrix(vec![vec![NAN; 4]]);
        assert!(matches!(m.drop_all_nan(), Err(PerfError::Shape { .. })));
    }

    #[test]
    fn test_drop_nan_rows_threshold() {
        let m = matrix(vec![
            vec![NAN, 1.0, NAN, 2.0],
            vec![NAN, NAN, 5.0, 6.0],
            vec![NAN, 3.0, 4.0, NAN],
        ]);
        let (cleaned, dropped) = m.drop_nan_rows(1).unwrap();
        assert_eq!(dropped, vec![parse_date("2021-01-04").unwrap()]);
        assert_eq!(cleaned.n_rows(), 3);

        // every row has at least one gap
        assert!(matches!(m.drop_nan_rows(0), Err(PerfError::Shape { .. })));
    }

    #[test]
    fn test_drop_nan_columns_threshold() {
        let m = matrix(vec![
            vec![NAN, 1.0, 2.0, 3.0],
            vec![NAN, NAN, 5.0, 6.0],
            vec![1.0, 3.0, 4.0, 5.0],
        ]);
        let (cleaned, dropped) = m.drop_nan_columns(1);
        assert_eq!(dropped, vec!["S1".to_string()]);
        assert_eq!(cleaned.n_cols(), 2);
    }

    #[test]
    fn test_fill_zero_rows_from_previous() {
        let m = matrix(vec![
            vec![0.0, 10.0, 0.0, 0.0],
            vec![0.0, 20.0, 0.0, 21.0],
        ]);
        let (filled, report) = m.fill_zero_rows_from_previous();

        assert_eq!(report.unfilled, vec![parse_date("2021-01-04").unwrap()]);
        assert_eq!(report.filled, vec![parse_date("2021-01-06").unwrap()]);
        assert_eq!(filled.column("S0").unwrap(), &[0.0, 10.0, 10.0, 0.0]);
        assert_eq!(filled.column("S1").unwrap(), &[0.0, 20.0, 20.0, 21.0]);
    }

    #[test]
    fn test_fill_zero_runs_forward() {
        let m = matrix(vec![vec![5.0, 0.0, 0.0, 6.0]]);
        let (filled, report) = m.fill_zero_rows_from_previous();
        assert_eq!(report.filled.len(), 2);
        assert_eq!(filled.column("S0").unwrap(), &[5.0, 5.0, 5.0, 6.0]);
    }
}
