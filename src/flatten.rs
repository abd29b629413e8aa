//! Explosion of a list-of-documents column into one row per element.
//!
//! [`explode_column`] produces the expanded element columns together with the
//! parent row each element came from. The pairing is positional: output row
//! `i` belongs to parent row `parents[i]`, and both sides keep input order.
//! A parent whose list is empty, null or absent still yields one padding row
//! whose element columns are all null.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::{
    data::Value,
    error::FrameError,
    frame::{Frame, Row},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Exploded {
    /// Parent row index for every element row.
    pub parents: Vec<usize>,
    /// `true` where the row stands in for an empty or absent list.
    pub padding: Vec<bool>,
    /// Expanded element fields, one row per element.
    pub items: Frame,
    list_column: String,
}

/// Flattens nested objects into dotted keys (`a.b.c`). Lists stay whole.
pub fn flatten_object(map: &Map<String, JsonValue>) -> Vec<(String, Option<Value>)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, JsonValue>, out: &mut Vec<(String, Option<Value>)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            JsonValue::Object(inner) if !inner.is_empty() => flatten_into(&name, inner, out),
            other => out.push((name, Value::from_json(other.clone()))),
        }
    }
}

fn list_elements(cell: Option<&Value>) -> Vec<Option<&Map<String, JsonValue>>> {
    match cell {
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => vec![Some(map)],
        _ => Vec::new(),
    }
}

pub fn explode_column(frame: &Frame, column: &str) -> Result<Exploded, FrameError> {
    let list_index = frame.require_column(column)?;

    let mut parents = Vec::new();
    let mut padding = Vec::new();
    let mut flattened: Vec<Vec<(String, Option<Value>)>> = Vec::new();
    let mut item_columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (row_index, row) in frame.rows.iter().enumerate() {
        let elements = list_elements(row.get(list_index).and_then(Option::as_ref));
        if elements.is_empty() {
            parents.push(row_index);
            padding.push(true);
            flattened.push(Vec::new());
            continue;
        }
        for element in elements {
            let fields = element.map(flatten_object).unwrap_or_default();
            for (name, _) in &fields {
                if !positions.contains_key(name) {
                    positions.insert(name.clone(), item_columns.len());
                    item_columns.push(name.clone());
                }
            }
            parents.push(row_index);
            padding.push(false);
            flattened.push(fields);
        }
    }

    let rows = flattened
        .into_iter()
        .map(|fields| {
            let mut row: Row = vec![None; item_columns.len()];
            for (name, value) in fields {
                row[positions[&name]] = value;
            }
            row
        })
        .collect();

    Ok(Exploded {
        parents,
        padding,
        items: Frame {
            columns: item_columns,
            rows,
        },
        list_column: column.to_string(),
    })
}

impl Exploded {
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Pairs every element row with the non-list columns of its parent.
    /// Element columns that collide with a parent column are prefixed with
    /// the list column name.
    pub fn join(self, parent: &Frame) -> Result<Frame, FrameError> {
        let list_index = parent.require_column(&self.list_column)?;
        let mut columns: Vec<String> = parent
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != list_index)
            .map(|(_, name)| name.clone())
            .collect();
        for name in &self.items.columns {
            if columns.contains(name) {
                columns.push(format!("{}.{name}", self.list_column));
            } else {
                columns.push(name.clone());
            }
        }

        let rows = self
            .parents
            .iter()
            .zip(self.items.rows)
            .map(|(&parent_index, item_row)| {
                let mut row: Row = parent.rows[parent_index]
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != list_index)
                    .map(|(_, cell)| cell.clone())
                    .collect();
                row.extend(item_row);
                row
            })
            .collect();

        Ok(Frame { columns, rows })
    }

    /// Element rows only, without padding rows. When `parent_key` is given the
    /// parent's value for that column is carried as the first column, named
    /// `alias`.
    pub fn into_items(
        self,
        parent: &Frame,
        parent_key: Option<(&str, &str)>,
    ) -> Result<Frame, FrameError> {
        let key_index = parent_key
            .map(|(key, _)| parent.require_column(key))
            .transpose()?;

        let mut columns = Vec::with_capacity(self.items.columns.len() + 1);
        if let Some((_, alias)) = parent_key {
            columns.push(alias.to_string());
        }
        columns.extend(self.items.columns);

        let rows = self
            .parents
            .into_iter()
            .zip(self.padding)
            .zip(self.items.rows)
            .filter(|((_, padding), _)| !padding)
            .map(|((parent_index, _), item_row)| {
                let mut row: Row = Vec::with_capacity(columns.len());
                if let Some(idx) = key_index {
                    row.push(parent.rows[parent_index][idx].clone());
                }
                row.extend(item_row);
                row
            })
            .collect();

        Ok(Frame { columns, rows })
    }
}

/// Explode `column` and join the element fields back onto their parents.
pub fn flatten(frame: &Frame, column: &str) -> Result<Frame, FrameError> {
    explode_column(frame, column)?.join(frame)
}
