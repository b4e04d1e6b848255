//! Decoded cell values and coercion primitives.
//!
//! Snapshot table files carry untyped JSON cells. The functions here coerce
//! them into typed values keyed by the declared [`ColumnKind`]. They are
//! total on well-formed input: nulls decode to the kind's zero value and
//! numeric strings coerce, matching what the exporter emits.

use crate::schema::table::ColumnKind;
use serde_json::Value as Json;

/// An ordered sequence of untyped rows, as deserialized from one table file.
/// The first row of a parsed file is the column-name header.
pub type ResultSet = Vec<Vec<Json>>;

/// A decoded, typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    StrList(Vec<String>),
}

impl Value {
    /// String content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float content, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String list content, if this is a list value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::StrList(l) => Some(l),
            _ => None,
        }
    }
}

/// Decode a raw cell into a typed value per the declared column kind.
pub fn decode(kind: ColumnKind, raw: &Json) -> Value {
    match kind {
        ColumnKind::String => Value::Str(as_string(raw)),
        ColumnKind::Int | ColumnKind::Int64 => Value::Int(as_i64(raw)),
        ColumnKind::Float => Value::Float(as_f64(raw)),
        ColumnKind::StringList => Value::StrList(as_string_list(raw)),
    }
}

/// Coerce a raw cell to a string. Nulls become the empty string, anything
/// non-string renders through its JSON form.
pub fn as_string(raw: &Json) -> String {
    match raw {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a raw cell to an i64. Floats truncate, numeric strings parse,
/// everything else is zero.
pub fn as_i64(raw: &Json) -> i64 {
    match raw {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Json::String(s) => s.trim().parse().unwrap_or(0),
        Json::Bool(b) => *b as i64,
        _ => 0,
    }
}

/// Coerce a raw cell to an f64.
pub fn as_f64(raw: &Json) -> f64 {
    match raw {
        Json::Number(n) => n.as_f64().unwrap_or(0.0),
        Json::String(s) => s.trim().parse().unwrap_or(0.0),
        Json::Bool(b) => *b as i64 as f64,
        _ => 0.0,
    }
}

/// Coerce a raw cell to a string list. Arrays coerce element-wise, nulls
/// become the empty list, a scalar becomes a single-element list.
pub fn as_string_list(raw: &Json) -> Vec<String> {
    match raw {
        Json::Array(items) => items.iter().map(as_string).collect(),
        Json::Null => Vec::new(),
        other => vec![as_string(other)],
    }
}
