use std::collections::HashMap;

use anyhow::{Result, anyhow};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    cli::DistinctArgs,
    data::{cell_key, display_cell},
    error::FrameError,
    frame::Frame,
    pipeline, table,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctOptions {
    pub top: usize,
    pub by_count: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctValues {
    pub column: String,
    pub total: usize,
    /// Display value and count, in order of first appearance.
    pub values: Vec<(String, usize)>,
}

pub fn distinct_values(frame: &Frame, column: &str) -> Result<DistinctValues, FrameError> {
    let idx = frame.require_column(column)?;
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut values: Vec<(String, usize)> = Vec::new();
    let mut total = 0usize;
    for cell in frame.column(idx) {
        total += 1;
        let key = cell_key(cell);
        match positions.get(&key) {
            Some(&position) => values[position].1 += 1,
            None => {
                positions.insert(key, values.len());
                values.push((display_cell(cell), 1));
            }
        }
    }
    Ok(DistinctValues {
        column: column.to_string(),
        total,
        values,
    })
}

impl DistinctValues {
    pub fn render_rows(&self, options: &DistinctOptions) -> Vec<Vec<String>> {
        if self.total == 0 {
            return Vec::new();
        }
        let mut items = if options.by_count {
            self.values
                .iter()
                .cloned()
                .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
                .collect_vec()
        } else {
            self.values.clone()
        };
        if options.top > 0 && items.len() > options.top {
            items.truncate(options.top);
        }
        items
            .into_iter()
            .map(|(value, count)| {
                let percent = (count as f64 / self.total as f64) * 100.0;
                vec![
                    self.column.clone(),
                    value,
                    count.to_string(),
                    format!("{percent:.2}%"),
                ]
            })
            .collect()
    }
}

pub fn headers() -> Vec<String> {
    ["column", "value", "count", "percent"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn compute_distinct_rows(
    frame: &Frame,
    columns: &[String],
    options: &DistinctOptions,
) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for column in columns {
        rows.extend(distinct_values(frame, column)?.render_rows(options));
    }
    Ok(rows)
}

/// Profile columns the frame actually carries. A profile column that no
/// record holds is skipped rather than treated as an error.
pub fn present_columns(frame: &Frame, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|column| {
            let present = frame.column_index(column).is_some();
            if !present {
                debug!("Skipping categorical field '{column}': no record carries it");
            }
            present
        })
        .cloned()
        .collect()
}

pub fn execute(args: &DistinctArgs) -> Result<()> {
    let (dataset, frame) = pipeline::load_source(&args.source)?;
    let columns = if args.columns.is_empty() {
        present_columns(&frame, &dataset.profile.categorical_fields)
    } else {
        args.columns.clone()
    };
    if columns.is_empty() {
        return Err(anyhow!(
            "Profile '{}' names no categorical columns present in the input. Supply --columns to continue.",
            dataset.profile.name
        ));
    }
    let options = DistinctOptions {
        top: args.top,
        by_count: args.by_count,
    };
    let rows = compute_distinct_rows(&frame, &columns, &options)?;
    table::print_table(&headers(), &rows);
    info!("Listed distinct values for {} column(s)", columns.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn categories() -> Frame {
        let mut frame = Frame::new(vec!["category".to_string()]);
        frame.rows = ["Baking", "Beverages", "Baking", "", "Beverages", "Baking"]
            .iter()
            .map(|name| {
                if name.is_empty() {
                    vec![None]
                } else {
                    vec![Some(Value::String(name.to_string()))]
                }
            })
            .collect();
        frame
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let distinct = distinct_values(&categories(), "category").unwrap();
        assert_eq!(
            distinct.values,
            vec![
                ("Baking".to_string(), 3),
                ("Beverages".to_string(), 2),
                ("<null>".to_string(), 1),
            ]
        );
    }

    #[test]
    fn present_columns_skips_fields_no_record_carries() {
        let columns = vec!["rewardsReceiptStatus".to_string(), "category".to_string()];
        assert_eq!(present_columns(&categories(), &columns), vec!["category"]);
        assert!(present_columns(&Frame::default(), &columns).is_empty());
    }

    #[test]
    fn render_rows_orders_by_count_and_limits() {
        let distinct = distinct_values(&categories(), "category").unwrap();
        let rows = distinct.render_rows(&DistinctOptions {
            top: 1,
            by_count: true,
        });
        assert_eq!(rows, vec![vec!["category", "Baking", "3", "50.00%"]]);
    }
}
