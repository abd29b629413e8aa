//! A small row-major table over sparse documents.
//!
//! Columns are the union of document keys in first-seen order. A field that a
//! document lacks is stored exactly like an explicit JSON `null`: as `None`.

use std::collections::HashMap;

use crate::{
    data::{Document, Value},
    error::FrameError,
};

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_documents(documents: &[Document]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for document in documents {
            for key in document.keys() {
                if !positions.contains_key(key) {
                    positions.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = documents
            .iter()
            .map(|document| {
                let mut row: Row = vec![None; columns.len()];
                for (key, value) in document {
                    row[positions[key]] = Value::from_json(value.clone());
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, FrameError> {
        self.column_index(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&Value>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(Option::as_ref))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_ref()
    }

    /// Rewrites every cell of one column in place.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        for row in &mut self.rows {
            if let Some(slot) = row.get_mut(index) {
                *slot = f(slot.take());
            }
        }
    }

    pub fn head(&self, n: usize) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}
