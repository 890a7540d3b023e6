//! Per-column value profiles for filter pickers.

use std::collections::HashSet;

use serde::Serialize;

use super::value::CellValue;
use super::Table;

/// Maximum distinct values sampled per column.
pub const MAX_PROFILE_VALUES: usize = 50;

/// Summary of one column: its name and a bounded sample of distinct values.
///
/// Values appear in first-occurrence order, capped at [`MAX_PROFILE_VALUES`].
/// Distinctness is judged on the native cell value; the sample carries the
/// stringified forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub unique_values: Vec<String>,
}

/// Profile every column of a table, in table order.
///
/// Null cells are skipped. The scan of a column stops as soon as the sample
/// is full, so wide-cardinality columns stay cheap.
pub fn profile_columns(table: &Table) -> Vec<ColumnProfile> {
    let mut profiles = Vec::with_capacity(table.column_count());
    for (idx, name) in table.columns().iter().enumerate() {
        let mut seen: HashSet<&CellValue> = HashSet::new();
        let mut unique_values = Vec::new();
        for row in table.rows() {
            if unique_values.len() == MAX_PROFILE_VALUES {
                break;
            }
            let cell = &row[idx];
            if cell.is_null() {
                continue;
            }
            if seen.insert(cell) {
                unique_values.push(cell.render().into_owned());
            }
        }
        profiles.push(ColumnProfile {
            name: name.clone(),
            unique_values,
        });
    }
    profiles
}
