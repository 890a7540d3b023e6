//! Grouped row counts shaped for bar, line, and pie charts.

use std::collections::HashMap;

use thiserror::Error;

use super::value::CellValue;
use super::Table;

/// Chart shapes the aggregation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bar" => Some(Self::Bar),
            "line" => Some(Self::Line),
            "pie" => Some(Self::Pie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

/// One aggregation request: a chart type (validated during the run) and an
/// optional group-by column.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: String,
    pub group_by: Option<String>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            chart_type: "bar".to_string(),
            group_by: None,
        }
    }
}

/// Errors from the aggregation run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("Unsupported chart type")]
    UnsupportedType,

    #[error("No columns available for grouping")]
    NoColumns,
}

/// Group rows by a column and count them, shaped for the requested chart.
///
/// The group-by column defaults to the table's first column when absent or
/// unknown. Groups keep first-seen order; a null cell forms its own group
/// whose output key is the empty string. `bar`/`line` keep the column name
/// as the key field, `pie` uses `name`.
pub fn run_chart(
    table: &Table,
    spec: &ChartSpec,
) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, ChartError> {
    let col = resolve_group_column(table, spec.group_by.as_deref())?;
    let kind = ChartKind::parse(&spec.chart_type).ok_or(ChartError::UnsupportedType)?;

    let key_field = match kind {
        ChartKind::Bar | ChartKind::Line => table.columns()[col].as_str(),
        ChartKind::Pie => "name",
    };

    let groups = group_counts(table, col);
    let data = groups
        .into_iter()
        .map(|(cell, count)| {
            let mut entry = serde_json::Map::with_capacity(2);
            entry.insert(key_field.to_string(), group_key_json(cell));
            entry.insert("value".to_string(), serde_json::Value::from(count));
            entry
        })
        .collect();
    Ok(data)
}

/// Pick the grouping column: the requested one when it exists, otherwise
/// the first column. A zero-column table has nothing to group on.
fn resolve_group_column(table: &Table, group_by: Option<&str>) -> Result<usize, ChartError> {
    if let Some(name) = group_by {
        if let Some(col) = table.column_index(name) {
            return Ok(col);
        }
    }
    if table.column_count() == 0 {
        return Err(ChartError::NoColumns);
    }
    Ok(0)
}

/// Count rows per distinct cell value, groups in first-seen order.
fn group_counts(table: &Table, col: usize) -> Vec<(&CellValue, usize)> {
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    let mut order: Vec<&CellValue> = Vec::new();
    for row in table.rows() {
        let cell = &row[col];
        match counts.get_mut(cell) {
            Some(count) => *count += 1,
            None => {
                counts.insert(cell, 1);
                order.push(cell);
            }
        }
    }
    order.into_iter().map(|cell| (cell, counts[cell])).collect()
}

/// Null groups are keyed by their stringified (empty) form; everything else
/// keeps its native JSON value.
fn group_key_json(cell: &CellValue) -> serde_json::Value {
    if cell.is_null() {
        serde_json::Value::String(String::new())
    } else {
        cell.to_json()
    }
}
