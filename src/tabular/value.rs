//! Cell values and their ordering, rendering, and JSON forms.

use std::borrow::Cow;
use std::cmp::Ordering;

/// A single cell in a parsed table.
///
/// Numbers are always finite: construct them through [`CellValue::number`],
/// which maps non-finite input to `Null` and normalizes `-0.0` to `0.0` so
/// equality, hashing, and rendering agree.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

// Sound because Number is kept finite and free of -0.0.
impl Eq for CellValue {}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Null => state.write_u8(0),
            Self::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Self::Number(n) => {
                state.write_u8(2);
                n.to_bits().hash(state);
            }
            Self::Text(s) => {
                state.write_u8(3);
                s.hash(state);
            }
        }
    }
}

impl CellValue {
    /// Build a numeric cell, demoting non-finite values to `Null`.
    pub fn number(n: f64) -> Self {
        if !n.is_finite() {
            return Self::Null;
        }
        if n == 0.0 {
            return Self::Number(0.0);
        }
        Self::Number(n)
    }

    /// Interpret a raw text cell: trimmed-empty becomes `Null`, finite
    /// numbers become `Number`, everything else stays `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Self::number(n);
            }
        }
        Self::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical string form, shared by search matching, column profiles,
    /// and filter comparison. `Null` renders as the empty string.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// JSON form for API payloads. Integer-valued numbers serialize without
    /// a decimal point.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => {
                if is_integer_valued(*n) {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Value::from(*n)
                }
            }
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Type rank used when ordering cells of different variants.
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

/// Total order over cells: nulls, then booleans, then numbers, then text.
/// Within a variant the native order applies.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_integer_valued(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

fn format_number(n: f64) -> String {
    if is_integer_valued(n) {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
