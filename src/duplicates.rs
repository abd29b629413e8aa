use std::{collections::HashMap, hash::Hash};

use anyhow::Result;
use log::info;

use crate::{
    cli::DuplicatesArgs, data::cell_key, error::FrameError, frame::Frame, pipeline, table,
};

/// A row is duplicated when an earlier row carried the same key, so
/// `unique + duplicated == total`. Null keys compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    pub column: String,
    pub total: usize,
    pub unique: usize,
    pub duplicated: usize,
    pub repeated_keys: usize,
}

impl DuplicateReport {
    pub fn from_keys<K, I>(column: &str, keys: I) -> Self
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
    {
        let mut counts: HashMap<K, usize> = HashMap::new();
        let mut total = 0usize;
        for key in keys {
            total += 1;
            *counts.entry(key).or_insert(0) += 1;
        }
        let unique = counts.len();
        let repeated_keys = counts.values().filter(|count| **count > 1).count();
        Self {
            column: column.to_string(),
            total,
            unique,
            duplicated: total - unique,
            repeated_keys,
        }
    }

    pub fn for_column(frame: &Frame, column: &str) -> Result<Self, FrameError> {
        let idx = frame.require_column(column)?;
        Ok(Self::from_keys(column, frame.column(idx).map(cell_key)))
    }

    pub fn has_duplicates(&self) -> bool {
        self.duplicated > 0
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        let percent = |count: usize| {
            if self.total == 0 {
                String::new()
            } else {
                format!("{:.2}%", count as f64 / self.total as f64 * 100.0)
            }
        };
        vec![
            vec!["unique".to_string(), self.unique.to_string(), percent(self.unique)],
            vec![
                "duplicated".to_string(),
                self.duplicated.to_string(),
                percent(self.duplicated),
            ],
            vec!["total".to_string(), self.total.to_string(), percent(self.total)],
            vec![
                "repeated keys".to_string(),
                self.repeated_keys.to_string(),
                String::new(),
            ],
        ]
    }
}

pub fn headers(column: &str) -> Vec<String> {
    vec![column.to_string(), "rows".to_string(), "percent".to_string()]
}

pub fn print_report(report: &DuplicateReport) {
    table::print_table(&headers(&report.column), &report.render_rows());
}

pub fn execute(args: &DuplicatesArgs) -> Result<()> {
    let (dataset, frame) = pipeline::load_source(&args.source)?;
    let key = args.key.as_deref().unwrap_or(&dataset.profile.key);
    let report = DuplicateReport::for_column(&frame, key)?;
    print_report(&report);
    info!(
        "Column '{}': {} duplicated row(s) across {} repeated key(s)",
        key, report.duplicated, report.repeated_keys
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    #[test]
    fn duplicated_plus_unique_equals_total() {
        let report = DuplicateReport::from_keys("_id", ["x1", "x1", "x2"]);
        assert_eq!(report.unique, 2);
        assert_eq!(report.duplicated, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.repeated_keys, 1);
    }

    #[test]
    fn null_keys_repeat_like_values() {
        let mut frame = Frame::new(vec!["_id".to_string()]);
        frame.rows = vec![
            vec![None],
            vec![None],
            vec![Some(Value::String("null".to_string()))],
        ];
        let report = DuplicateReport::for_column(&frame, "_id").unwrap();
        assert_eq!(report.duplicated, 1);
        assert_eq!(report.unique, 2);
    }

    #[test]
    fn render_rows_reports_percentages() {
        let report = DuplicateReport::from_keys("_id", ["a", "a", "a", "b"]);
        let rows = report.render_rows();
        assert_eq!(rows[0], vec!["unique", "2", "50.00%"]);
        assert_eq!(rows[1], vec!["duplicated", "2", "50.00%"]);
        assert_eq!(rows[3], vec!["repeated keys", "1", ""]);
    }
}
