use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Map, Number, Value as JsonValue};

/// A sparse source document: one parsed line of the input file.
pub type Document = Map<String, JsonValue>;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single non-null cell. Absent and explicit-null fields are both `None` at
/// the row level, so there is no null variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Object(Map<String, JsonValue>),
    List(Vec<JsonValue>),
}

impl Value {
    pub fn from_json(value: JsonValue) -> Option<Value> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(Value::Boolean(b)),
            JsonValue::Number(n) => Some(match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            JsonValue::String(s) => Some(Value::String(s)),
            JsonValue::Array(items) => Some(Value::List(items)),
            JsonValue::Object(map) => Some(Value::Object(map)),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::DateTime(dt) => JsonValue::String(dt.format(DATETIME_FORMAT).to_string()),
            Value::Object(map) => JsonValue::Object(map.clone()),
            Value::List(items) => JsonValue::Array(items.clone()),
        }
    }

    /// Short type label used by the column summary.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Boolean(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Object(_) => "object",
            Value::List(_) => "list",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Boolean(b) => b.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Object(_) | Value::List(_) => self.to_json().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub const NULL_DISPLAY: &str = "<null>";

pub fn display_cell(cell: Option<&Value>) -> String {
    cell.map(Value::as_display)
        .unwrap_or_else(|| NULL_DISPLAY.to_string())
}

/// Stable identity for a cell. Strings and numbers never collide because the
/// key is the cell's JSON encoding; null has its own key.
pub fn cell_key(cell: Option<&Value>) -> String {
    match cell {
        Some(value) => value.to_json().to_string(),
        None => "null".to_string(),
    }
}

pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
