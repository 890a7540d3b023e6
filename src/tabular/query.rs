//! Search, filter, sort, and pagination over a parsed table.
//!
//! The stages run in a fixed order: search narrows rows first, then equality
//! filters, then a single-column sort, then pagination. `total` counts rows
//! after search and filter but before pagination. The engine is a pure
//! function of its inputs; nothing is cached between calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::CellValue;
use super::Table;

/// Sort direction. Anything that is not `asc` (case-insensitive) means
/// descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One query over a table.
///
/// `page` and `limit` below 1 are treated as 1. Filter values compare
/// against the stringified cell, so `"30"` matches a numeric 30.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub page: usize,
    pub limit: usize,
    pub sort_column: Option<String>,
    pub sort_order: SortOrder,
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_column: None,
            sort_order: SortOrder::Asc,
            filters: Vec::new(),
            search: None,
        }
    }
}

/// A page of rows plus the post-filter total.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub total: usize,
}

/// Errors from decoding the `filters` request parameter.
#[derive(Debug, Error)]
pub enum InvalidFilter {
    #[error("filters is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("filters must be a JSON object mapping columns to values")]
    NotAnObject,

    #[error("filter value for column '{column}' must be a scalar")]
    NonScalarValue { column: String },
}

/// Decode a JSON-encoded filter object into `(column, value)` pairs.
///
/// Values are stringified the same way cells render, so a JSON `30`
/// matches a numeric cell and a JSON `null` matches a null cell.
pub fn parse_filters(raw: &str) -> Result<Vec<(String, String)>, InvalidFilter> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let object = match value {
        serde_json::Value::Object(map) => map,
        _ => return Err(InvalidFilter::NotAnObject),
    };

    let mut filters = Vec::with_capacity(object.len());
    for (column, value) in object {
        let rendered = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => {
                let n = n.as_f64().unwrap_or(0.0);
                CellValue::number(n).render().into_owned()
            }
            serde_json::Value::Bool(true) => "true".to_string(),
            serde_json::Value::Bool(false) => "false".to_string(),
            serde_json::Value::Null => String::new(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(InvalidFilter::NonScalarValue { column });
            }
        };
        filters.push((column, rendered));
    }
    Ok(filters)
}

/// Run a query: search, filter, sort, paginate, in that order.
pub fn run_query(table: &Table, spec: &QuerySpec) -> QueryOutput {
    let mut indices: Vec<usize> = (0..table.row_count()).collect();

    // Search: any column's stringified value contains the needle,
    // case-insensitively. Null cells never match.
    if let Some(search) = spec.search.as_deref() {
        if !search.is_empty() {
            let needle = search.to_lowercase();
            indices.retain(|&row| {
                table.rows()[row].iter().any(|cell| {
                    !cell.is_null() && cell.render().to_lowercase().contains(&needle)
                })
            });
        }
    }

    // Filters: exact match on the stringified cell. Unknown columns are
    // ignored rather than erroring.
    for (column, value) in &spec.filters {
        if let Some(col) = table.column_index(column) {
            indices.retain(|&row| table.rows()[row][col].render() == value.as_str());
        }
    }

    // Sort: stable, so equal keys keep their post-filter relative order.
    // Descending reverses the comparator, putting nulls last.
    if let Some(name) = spec.sort_column.as_deref() {
        if let Some(col) = table.column_index(name) {
            match spec.sort_order {
                SortOrder::Asc => {
                    indices.sort_by(|&a, &b| table.rows()[a][col].cmp(&table.rows()[b][col]));
                }
                SortOrder::Desc => {
                    indices.sort_by(|&a, &b| table.rows()[b][col].cmp(&table.rows()[a][col]));
                }
            }
        }
    }

    let total = indices.len();
    let page = spec.page.max(1);
    let limit = spec.limit.max(1);
    let start = (page - 1).saturating_mul(limit);

    let rows = indices
        .iter()
        .skip(start)
        .take(limit)
        .map(|&row| table.row_object(row))
        .collect();

    QueryOutput { rows, total }
}
