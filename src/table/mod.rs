//! Tabular input: recipient tables loaded from XLSX or CSV bytes.
//!
//! Everything downstream works on string cells; numeric XLSX cells are
//! rendered the way a spreadsheet shows them (no trailing `.0` on whole
//! numbers) so names and links survive the trip intact.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read XLSX workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported table format '{0}' (use .xlsx or .csv)")]
    UnsupportedFormat(String),
    #[error("table has no header row")]
    EmptyTable,
    #[error("column '{0}' not found in table headers")]
    MissingColumn(String),
}

/// An in-memory table: one header row plus string cells.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Load from bytes, dispatching on the uploaded filename's extension.
    pub fn load(filename: &str, bytes: &[u8]) -> Result<Self, TableError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".xlsx") {
            Self::from_xlsx(bytes)
        } else if lower.ends_with(".csv") {
            Self::from_csv(bytes)
        } else {
            Err(TableError::UnsupportedFormat(filename.to_string()))
        }
    }

    /// First worksheet of an XLSX workbook; first row becomes the headers.
    pub fn from_xlsx(bytes: &[u8]) -> Result<Self, TableError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(TableError::NoWorksheet)??;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .ok_or(TableError::EmptyTable)?
            .iter()
            .map(cell_to_string)
            .collect();

        let width = headers.len();
        let rows = rows_iter
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(width, String::new());
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which headers hold the recipient name and the link, as the caller picks
/// them in the UI.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColumnSelection {
    #[schema(example = "Nama Penyelenggara")]
    pub name_column: String,
    #[schema(example = "Link Surat")]
    pub link_column: String,
}

/// The selection resolved against a concrete table, validated once before a
/// run starts.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub name: usize,
    pub link: usize,
}

impl ColumnMapping {
    pub fn resolve(table: &DataTable, selection: &ColumnSelection) -> Result<Self, TableError> {
        let name = table
            .column_index(&selection.name_column)
            .ok_or_else(|| TableError::MissingColumn(selection.name_column.clone()))?;
        let link = table
            .column_index(&selection.link_column)
            .ok_or_else(|| TableError::MissingColumn(selection.link_column.clone()))?;
        Ok(Self { name, link })
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}
