//! In-memory tabular data model and the operations that run on it.
//!
//! A parsed upload becomes a [`Table`]: ordered column names plus rows of
//! [`CellValue`]s. The submodules each cover one stage of the read path:
//! [`parse`] turns raw CSV/Excel bytes into a table, [`profile`] summarizes
//! columns for filter pickers, [`query`] runs search/filter/sort/pagination,
//! and [`chart`] groups rows into chart payloads.

pub mod chart;
pub mod parse;
pub mod profile;
pub mod query;
pub mod value;

pub use chart::{run_chart, ChartError, ChartKind, ChartSpec};
pub use parse::{parse_table, ParseError, TabularFormat};
pub use profile::{profile_columns, ColumnProfile};
pub use query::{parse_filters, run_query, InvalidFilter, QueryOutput, QuerySpec, SortOrder};
pub use value::CellValue;

/// A fully materialized tabular dataset.
///
/// Columns are ordered as they appeared in the source file. Every row has
/// exactly one cell per column; the parsers enforce this.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Serialize one row as a JSON object keyed by column name.
    pub fn row_object(&self, row_idx: usize) -> serde_json::Map<String, serde_json::Value> {
        let mut object = serde_json::Map::with_capacity(self.columns.len());
        for (col, cell) in self.columns.iter().zip(&self.rows[row_idx]) {
            object.insert(col.clone(), cell.to_json());
        }
        object
    }
}
