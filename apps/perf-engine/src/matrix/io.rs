//! Close-price CSV files.
//!
//! Layout: a header with the date column followed by one column per symbol,
//! then one row per trading date. Empty cells (and `NaN`) are missing closes.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use super::PriceMatrix;
use crate::dates::{DateIndex, parse_date};
use crate::error::{PerfError, Result};

/// Read a close-price matrix from any reader.
///
/// # Errors
///
/// `Value` when the date column is missing or a cell is not a number,
/// `Shape` when there are no data rows, `Csv` on malformed records.
pub fn read_close_csv<R: Read>(reader: R, date_column: &str) -> Result<PriceMatrix> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let date_pos = headers
        .iter()
        .position(|h| h.trim() == date_column)
        .ok_or_else(|| PerfError::value(date_column, "date column not found in CSV header"))?;
    let symbols: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_pos)
        .map(|(_, h)| h.trim().to_string())
        .collect();

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); symbols.len()];
    for record in reader.records() {
        let record = record?;
        dates.push(parse_date(record.get(date_pos).unwrap_or_default())?);

        let cells = record.iter().enumerate().filter(|(i, _)| *i != date_pos);
        for ((_, cell), (symbol, column)) in cells.zip(symbols.iter().zip(columns.iter_mut())) {
            column.push(parse_close(cell, symbol)?);
        }
    }

    if dates.is_empty() {
        return Err(PerfError::shape("CSV has no data rows"));
    }
    PriceMatrix::new(DateIndex::new(dates)?, symbols, columns)
}

/// Load a close-price matrix from a CSV file.
///
/// # Errors
///
/// `Io` when the file cannot be opened, otherwise as [`read_close_csv`].
pub fn load_close_csv(path: impl AsRef<Path>, date_column: &str) -> Result<PriceMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PerfError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let matrix = read_close_csv(file, date_column)?;
    info!(
        path = %path.display(),
        rows = matrix.n_rows(),
        symbols = matrix.n_cols(),
        "Loaded close prices"
    );
    Ok(matrix)
}

/// Write a close-price matrix in the same layout [`read_close_csv`] reads.
///
/// # Errors
///
/// `Csv` when a record cannot be written.
pub fn write_close_csv<W: Write>(matrix: &PriceMatrix, writer: W, date_column: &str) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(matrix.n_cols() + 1);
    header.push(date_column.to_string());
    header.extend(matrix.symbols().iter().cloned());
    writer.write_record(&header)?;

    for (row, date) in matrix.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(matrix.n_cols() + 1);
        record.push(date.to_string());
        record.extend(matrix.columns().iter().map(|c| {
            let v = c[row];
            if v.is_nan() { String::new() } else { v.to_string() }
        }));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|source| PerfError::Io {
        path: "<writer>".to_string(),
        source,
    })?;
    Ok(())
}

fn parse_close(cell: &str, symbol: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|_| PerfError::value(symbol, format!("'{cell}' is not a number")))
}
