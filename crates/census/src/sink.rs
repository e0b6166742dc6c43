//! Output sinks for the assembled record batch.

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use extract::ExtractedRecord;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SHEET_NAME: &str = "Censo";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Create the file, replacing any previous content.
    Overwrite,
    /// Keep existing rows and add the batch after them.
    Append,
}

/// Consumer of a finished batch. Writes happen once per run, from a single
/// caller, so rows land in batch order.
pub trait RecordSink {
    /// Returns the number of rows now in the output, header excluded.
    fn write(&self, records: &[ExtractedRecord], mode: WriteMode) -> Result<usize>;

    fn path(&self) -> &Path;
}

/// Writes the census to sheet `Censo` of an `.xlsx` workbook.
///
/// Append rewrites the whole file: the rows of the existing `Censo` sheet
/// (or the first sheet when there is none) are read back with their cell
/// types and the batch is added after them. Other sheets, formulas and
/// formatting in the existing file are not carried over.
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Data rows of the census sheet of an existing workbook, header skipped.
    fn existing_rows(&self) -> Result<Vec<Vec<Data>>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .context(format!("Failed to open workbook: {:?}", self.path))?;

        let sheets = workbook.sheet_names();
        let Some(sheet) = sheets
            .iter()
            .find(|name| name.as_str() == SHEET_NAME)
            .or_else(|| sheets.first())
            .cloned()
        else {
            return Ok(Vec::new());
        };
        if sheets.len() > 1 {
            warn!(path = ?self.path, sheet = %sheet, dropped = sheets.len() - 1, "Only the census sheet is kept on append");
        }

        let range = workbook
            .worksheet_range(&sheet)
            .context(format!("Failed to read workbook: {:?}", self.path))?;
        Ok(range.rows().skip(1).map(|row| row.to_vec()).collect())
    }
}

impl RecordSink for XlsxSink {
    fn write(&self, records: &[ExtractedRecord], mode: WriteMode) -> Result<usize> {
        let mut rows = match mode {
            WriteMode::Append if self.path.exists() => self.existing_rows()?,
            WriteMode::Append => {
                warn!(path = ?self.path, "Nothing to append to, creating a new workbook");
                Vec::new()
            }
            WriteMode::Overwrite => Vec::new(),
        };
        rows.extend(
            records
                .iter()
                .map(|r| r.to_row().into_iter().map(Data::String).collect()),
        );

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let header_format = Format::new().set_bold();
        let mut widths: Vec<usize> = ExtractedRecord::COLUMNS
            .iter()
            .map(|h| h.chars().count())
            .collect();

        for (col, header) in ExtractedRecord::COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, cell) in row.iter().enumerate().take(widths.len()) {
                let col_num = col as u16;
                match cell {
                    Data::Empty => continue,
                    Data::Float(f) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                    Data::Int(i) => {
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    Data::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    other => {
                        worksheet.write_string(row_num, col_num, other.to_string())?;
                    }
                }
                widths[col] = widths[col].max(cell.to_string().chars().count());
            }
        }

        // Fit each column to its longest cell.
        for (col, width) in widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, (*width + 2) as f64)?;
        }

        workbook
            .save(&self.path)
            .context(format!("Failed to save workbook: {:?}", self.path))?;

        info!(path = ?self.path, rows = rows.len(), appended = records.len(), "Workbook written");
        Ok(rows.len())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes the batch as a JSON array of row objects keyed by column header.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for JsonSink {
    fn write(&self, records: &[ExtractedRecord], mode: WriteMode) -> Result<usize> {
        let mut rows: Vec<serde_json::Value> = match mode {
            WriteMode::Append if self.path.exists() => {
                let content = std::fs::read_to_string(&self.path)
                    .context(format!("Failed to read file: {:?}", self.path))?;
                serde_json::from_str(&content)
                    .context(format!("Existing output is not a JSON array: {:?}", self.path))?
            }
            _ => Vec::new(),
        };
        for record in records {
            rows.push(serde_json::to_value(record)?);
        }

        let json = serde_json::to_string_pretty(&rows)?;
        std::fs::write(&self.path, json)
            .context(format!("Failed to write file: {:?}", self.path))?;

        info!(path = ?self.path, rows = rows.len(), appended = records.len(), "JSON written");
        Ok(rows.len())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
