//! Cell value classification.
//!
//! Providers hand back loosely-typed [`serde_json::Value`]s; classification
//! maps them onto the four encodable kinds. The one rule that is easy to
//! miss: a text value whose first character is `=` is a formula, and the
//! `=` is stripped before encoding.

use serde::{Deserialize, Serialize};

/// An encodable cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellValue {
    /// Plain text, interned into the shared string table.
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Formula text without the leading `=`.
    Formula(String),
}

impl CellValue {
    /// Classify a raw provider value.
    ///
    /// Dispatch order: boolean, `=`-prefixed string (formula), other string
    /// (text), number. Arrays, objects and nulls are not encodable; callers
    /// treat null as "no value" before classifying. Runs once per cell, so
    /// it only inspects the outermost variant.
    pub fn classify(raw: &serde_json::Value) -> Result<Self, UnsupportedValueKind> {
        match raw {
            serde_json::Value::Bool(b) => Ok(CellValue::Boolean(*b)),
            serde_json::Value::String(s) => match s.strip_prefix('=') {
                Some(formula) => Ok(CellValue::Formula(formula.to_string())),
                None => Ok(CellValue::Text(s.clone())),
            },
            serde_json::Value::Number(n) => Ok(CellValue::Number(n.as_f64().unwrap_or_default())),
            other => Err(UnsupportedValueKind(kind_name(other))),
        }
    }
}

/// The dynamic kind of a value that cannot be encoded into a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedValueKind(pub &'static str);

fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
