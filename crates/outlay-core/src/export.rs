//! Spreadsheet export
//!
//! Supports:
//! - Excel workbook (`.xlsx`), the default: one "Expenses" sheet, bold header
//!   row, amounts stored as numbers with two decimals
//! - CSV with the same title-cased headers

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use csv::WriterBuilder;
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Field, Table};

/// Suggested file name for the default (xlsx) export
pub const EXPORT_FILE_NAME: &str = "expenses.xlsx";

const SHEET_NAME: &str = "Expenses";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Default output file name
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Xlsx => EXPORT_FILE_NAME,
            // Not `expenses.csv`: that is the ledger itself
            Self::Csv => "expenses-export.csv",
        }
    }

    /// Serialize a table in this format
    pub fn render(&self, table: &Table) -> Result<Vec<u8>> {
        match self {
            Self::Xlsx => export_spreadsheet(table),
            Self::Csv => export_csv(table),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format '{}' (expected 'xlsx' or 'csv')",
                other
            ))),
        }
    }
}

/// Serialize a table as an in-memory Excel workbook
pub fn export_spreadsheet(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let amount_col = table
        .columns
        .iter()
        .position(|c| c == Field::Amount.title());

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, label) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, label, &header)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell.parse::<f64>() {
                Ok(amount) if Some(col) == amount_col => {
                    sheet.write_number_with_format(r, c, amount, &money)?;
                }
                _ => {
                    sheet.write_string(r, c, cell)?;
                }
            }
        }
    }

    sheet.autofit();
    Ok(workbook.save_to_buffer()?)
}

/// Serialize a table as CSV with one header row
pub fn export_csv(table: &Table) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Write the export to `path`, returning the number of rows written
pub fn export_to_file(table: &Table, path: &Path, format: ExportFormat) -> Result<usize> {
    let bytes = format.render(table)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    info!(
        rows = table.len(),
        format = %format,
        "Exported expenses to {}",
        path.display()
    );
    Ok(table.len())
}
