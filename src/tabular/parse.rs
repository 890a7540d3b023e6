//! Parsing raw upload bytes into a [`Table`].
//!
//! CSV goes through the `csv` crate with flexible record lengths: short rows
//! are padded with nulls, rows wider than the header are rejected. Excel goes
//! through `calamine`; only the first worksheet is read.

use std::io::Cursor;

use calamine::{Data, DataType, Reader};
use thiserror::Error;

use super::value::CellValue;
use super::Table;

/// File formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xls,
    Xlsx,
}

impl TabularFormat {
    /// Resolve a format from a filename extension (case-insensitive).
    /// Returns `None` when there is no extension or it is not recognized.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
        }
    }
}

impl std::fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from parsing upload bytes.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV data row had more cells than the header.
    #[error("row {row} has {cells} cells but the header has {columns} columns")]
    RowTooWide {
        row: usize,
        cells: usize,
        columns: usize,
    },

    #[error("Excel parse error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("workbook has no sheets")]
    NoSheets,
}

/// Parse upload bytes in the given format.
pub fn parse_table(format: TabularFormat, bytes: &[u8]) -> Result<Table, ParseError> {
    match format {
        TabularFormat::Csv => parse_csv(bytes),
        TabularFormat::Xls | TabularFormat::Xlsx => parse_excel(bytes),
    }
}

/// Parse CSV bytes. The first record is the header; blank header cells get
/// positional names. Empty input yields a zero-column table.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| resolve_header(name, idx))
        .collect();

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(ParseError::RowTooWide {
                row: row_idx + 1,
                cells: record.len(),
                columns: columns.len(),
            });
        }
        let mut row: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        row.resize(columns.len(), CellValue::Null);
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

/// Parse an Excel workbook (xls or xlsx), reading only the first sheet.
pub fn parse_excel(bytes: &[u8]) -> Result<Table, ParseError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = workbook.worksheet_range_at(0).ok_or(ParseError::NoSheets)??;

    let mut cell_rows = range.rows();
    let columns: Vec<String> = match cell_rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name = cell.as_string().unwrap_or_default();
                resolve_header(&name, idx)
            })
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<CellValue>> = cell_rows
        .map(|cells| cells.iter().map(excel_cell).collect())
        .collect();

    Ok(Table::new(columns, rows))
}

/// Blank header cells become positional `column_N` names (1-based).
fn resolve_header(name: &str, idx: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        trimmed.to_string()
    }
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => CellValue::number(*f),
        Data::Int(i) => CellValue::number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Null,
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}
