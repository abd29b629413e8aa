//! Unwrapping of extended-JSON wrapper objects into scalar cells.
//!
//! Export tools tag some scalars with a single-key wrapper: `{"$oid": "..."}`
//! for identifiers and `{"$date": 1609687531000}` for timestamps. Each
//! decoder below classifies a cell as a raw scalar, a recognized wrapper, or
//! neither; the normalizers then keep the payload or write null. Nothing here
//! returns an error: malformed input always degrades to null, and running a
//! normalizer over its own output changes nothing.

use chrono::{DateTime, NaiveDateTime};
use log::debug;
use serde_json::{Map, Value as JsonValue};

use crate::{data::Value, frame::Frame};

pub const OID_MARKER: &str = "$oid";
pub const DATE_MARKER: &str = "$date";
pub const NUMBER_LONG_MARKER: &str = "$numberLong";
pub const REF_MARKER: &str = "$ref";
pub const REF_ID_MARKER: &str = "$id";
pub const REF_DB_MARKER: &str = "$db";

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The cell already held the scalar payload.
    Raw(T),
    /// The payload was taken out of a recognized wrapper object.
    Wrapped(T),
    Absent,
}

impl<T> Decoded<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Decoded::Raw(value) | Decoded::Wrapped(value) => Some(value),
            Decoded::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    ObjectId,
    Timestamp,
    Reference,
    Numeric,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::ObjectId => "object id",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Reference => "reference",
            FieldKind::Numeric => "numeric",
        }
    }
}

fn single_entry<'a>(map: &'a Map<String, JsonValue>, marker: &str) -> Option<&'a JsonValue> {
    if map.len() == 1 { map.get(marker) } else { None }
}

pub fn decode_object_id(cell: Option<&Value>) -> Decoded<String> {
    match cell {
        Some(Value::String(s)) => Decoded::Raw(s.clone()),
        Some(Value::Object(map)) => match single_entry(map, OID_MARKER) {
            Some(JsonValue::String(s)) => Decoded::Wrapped(s.clone()),
            _ => Decoded::Absent,
        },
        _ => Decoded::Absent,
    }
}

pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

fn decode_date_payload(payload: &JsonValue) -> Option<NaiveDateTime> {
    match payload {
        JsonValue::Number(n) => n.as_i64().and_then(millis_to_datetime),
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.naive_utc()),
        JsonValue::Object(inner) => match single_entry(inner, NUMBER_LONG_MARKER) {
            Some(JsonValue::String(s)) => s.trim().parse::<i64>().ok().and_then(millis_to_datetime),
            _ => None,
        },
        _ => None,
    }
}

pub fn decode_timestamp(cell: Option<&Value>) -> Decoded<NaiveDateTime> {
    let decoded = match cell {
        Some(Value::DateTime(dt)) => return Decoded::Raw(*dt),
        Some(Value::Integer(millis)) => millis_to_datetime(*millis).map(Decoded::Raw),
        Some(Value::Object(map)) => single_entry(map, DATE_MARKER)
            .and_then(decode_date_payload)
            .map(Decoded::Wrapped),
        _ => None,
    };
    decoded.unwrap_or(Decoded::Absent)
}

/// `{"$ref": "Cogs", "$id": {"$oid": "..."}}` decodes to the referenced id.
pub fn decode_reference(cell: Option<&Value>) -> Decoded<String> {
    match cell {
        Some(Value::String(s)) => Decoded::Raw(s.clone()),
        Some(Value::Object(map)) => {
            let known = map
                .keys()
                .all(|key| matches!(key.as_str(), REF_MARKER | REF_ID_MARKER | REF_DB_MARKER));
            if !known || !map.contains_key(REF_MARKER) {
                return Decoded::Absent;
            }
            let id = map.get(REF_ID_MARKER).cloned().and_then(Value::from_json);
            match decode_object_id(id.as_ref()) {
                Decoded::Raw(s) | Decoded::Wrapped(s) => Decoded::Wrapped(s),
                Decoded::Absent => Decoded::Absent,
            }
        }
        _ => Decoded::Absent,
    }
}

/// Amounts are frequently exported as strings (`"26.00"`).
pub fn coerce_numeric(cell: Option<&Value>) -> Option<f64> {
    match cell {
        Some(Value::Integer(i)) => Some(*i as f64),
        Some(Value::Float(f)) => Some(*f),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub fn normalize_cell(kind: FieldKind, cell: Option<Value>) -> Option<Value> {
    let cell = cell.as_ref();
    match kind {
        FieldKind::ObjectId => decode_object_id(cell).into_option().map(Value::String),
        FieldKind::Timestamp => decode_timestamp(cell).into_option().map(Value::DateTime),
        FieldKind::Reference => decode_reference(cell).into_option().map(Value::String),
        FieldKind::Numeric => coerce_numeric(cell).map(Value::Float),
    }
}

/// Normalizes the named columns of `frame` in place and returns how many
/// non-null cells were degraded to null. Columns the frame does not carry are
/// skipped: every record lacks the field, which is the same as all nulls.
pub fn normalize_fields(frame: &mut Frame, fields: &[String], kind: FieldKind) -> usize {
    let mut degraded = 0usize;
    for field in fields {
        let Some(index) = frame.column_index(field) else {
            debug!("Skipping {} field '{}': no record carries it", kind.as_str(), field);
            continue;
        };
        frame.map_column(index, |cell| {
            let had_value = cell.is_some();
            let normalized = normalize_cell(kind, cell);
            if had_value && normalized.is_none() {
                degraded += 1;
            }
            normalized
        });
    }
    if degraded > 0 {
        debug!("{degraded} {} cell(s) degraded to null", kind.as_str());
    }
    degraded
}
