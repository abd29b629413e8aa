use anyhow::{Result, anyhow};
use log::info;

use crate::{
    cli::DescribeArgs,
    data::{Value, format_float},
    frame::Frame,
    normalize::millis_to_datetime,
    pipeline, summary, table,
};

const DATETIME_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

pub fn execute(args: &DescribeArgs) -> Result<()> {
    let (_, frame) = pipeline::load_source(&args.source)?;
    let columns = resolve_columns(&frame, &args.columns)?;
    if columns.is_empty() {
        return Err(anyhow!(
            "No numeric or date-time columns available. Provide an explicit column list."
        ));
    }
    let rows = describe(&frame, &columns);
    table::print_table(&headers(), &rows);
    info!("Computed summary statistics for {} column(s)", rows.len());
    Ok(())
}

pub fn headers() -> Vec<String> {
    [
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Numeric,
    DateTime,
}

fn metric_kind(frame: &Frame, index: usize) -> Option<MetricKind> {
    match summary::infer_type(frame.column(index)) {
        "int" | "float" => Some(MetricKind::Numeric),
        "datetime" => Some(MetricKind::DateTime),
        _ => None,
    }
}

pub fn eligible_columns(frame: &Frame) -> Vec<(usize, MetricKind)> {
    (0..frame.columns.len())
        .filter_map(|idx| metric_kind(frame, idx).map(|kind| (idx, kind)))
        .collect()
}

/// Explicit columns must exist and be numeric or date-time; without a list
/// every eligible column is described.
pub fn resolve_columns(frame: &Frame, specified: &[String]) -> Result<Vec<(usize, MetricKind)>> {
    if specified.is_empty() {
        return Ok(eligible_columns(frame));
    }
    specified
        .iter()
        .map(|name| {
            let idx = frame.require_column(name)?;
            let kind = metric_kind(frame, idx).ok_or_else(|| {
                anyhow!(
                    "Column '{name}' is type {} and cannot be profiled for statistics",
                    summary::infer_type(frame.column(idx))
                )
            })?;
            Ok((idx, kind))
        })
        .collect()
}

pub fn describe(frame: &Frame, columns: &[(usize, MetricKind)]) -> Vec<Vec<String>> {
    columns
        .iter()
        .map(|&(idx, kind)| {
            let mut stats = ColumnStats::with_column(frame.columns[idx].clone(), kind);
            for value in frame.column(idx).flatten() {
                stats.add_value(value);
            }
            stats.render_row()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ColumnStats {
    name: String,
    kind: MetricKind,
    values: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn with_column(name: String, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            values: Vec::new(),
            sum: 0.0,
            min: None,
            max: None,
        }
    }

    pub fn add_value(&mut self, value: &Value) {
        let metric = match (self.kind, value) {
            (MetricKind::Numeric, other) => other.as_f64(),
            (MetricKind::DateTime, Value::DateTime(dt)) => {
                Some(dt.and_utc().timestamp_millis() as f64)
            }
            _ => None,
        };
        let Some(metric) = metric.filter(|m| !m.is_nan()) else {
            return;
        };
        self.sum += metric;
        self.min = Some(self.min.map_or(metric, |current| current.min(metric)));
        self.max = Some(self.max.map_or(metric, |current| current.max(metric)));
        self.values.push(metric);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.values.is_empty()).then(|| self.sum / self.values.len() as f64)
    }

    /// Sample standard deviation, computed in two passes so that large
    /// epoch-millisecond values do not cancel out.
    pub fn std_dev(&self) -> Option<f64> {
        if self.values.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squares = self
            .values
            .iter()
            .map(|value| (value - mean) * (value - mean))
            .sum::<f64>();
        Some((squares / (self.values.len() as f64 - 1.0)).sqrt())
    }

    pub fn sorted_values(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    pub fn render_row(&self) -> Vec<String> {
        let sorted = self.sorted_values();
        vec![
            self.name.clone(),
            self.count().to_string(),
            self.format_metric(self.mean()),
            self.format_spread(self.std_dev()),
            self.format_metric(self.min),
            self.format_metric(quantile(&sorted, 0.25)),
            self.format_metric(quantile(&sorted, 0.5)),
            self.format_metric(quantile(&sorted, 0.75)),
            self.format_metric(self.max),
        ]
    }

    fn format_metric(&self, metric: Option<f64>) -> String {
        metric
            .map(|value| match self.kind {
                MetricKind::Numeric => format_number(value),
                MetricKind::DateTime => millis_to_datetime(value.round() as i64)
                    .map(|dt| dt.format(DATETIME_DISPLAY).to_string())
                    .unwrap_or_default(),
            })
            .unwrap_or_default()
    }

    fn format_spread(&self, metric: Option<f64>) -> String {
        metric
            .map(|value| match self.kind {
                MetricKind::Numeric => format_number(value),
                MetricKind::DateTime => format_duration(value / 1000.0, "seconds"),
            })
            .unwrap_or_default()
    }
}

/// Linear interpolation between closest ranks over pre-sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format_float(value)
    } else {
        format!("{value:.4}")
    }
}

fn format_duration(value: f64, unit: &str) -> String {
    let magnitude = format!("{:.0}", value.abs());
    if value < 0.0 {
        format!("-{magnitude} {unit}")
    } else {
        format!("{magnitude} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn numeric_row_matches_describe_layout() {
        let mut stats = ColumnStats::with_column("totalSpent".to_string(), MetricKind::Numeric);
        for value in [Value::Integer(1), Value::Float(2.0), Value::Integer(3), Value::Float(4.0)] {
            stats.add_value(&value);
        }
        assert_eq!(
            stats.render_row(),
            vec!["totalSpent", "4", "2.5000", "1.2910", "1.0", "1.7500", "2.5000", "3.2500", "4.0"]
        );
    }

    #[test]
    fn datetime_row_renders_calendar_values() {
        let mut stats = ColumnStats::with_column("createDate".to_string(), MetricKind::DateTime);
        for millis in [1_609_687_531_000i64, 1_609_687_541_000] {
            stats.add_value(&Value::DateTime(millis_to_datetime(millis).unwrap()));
        }
        let row = stats.render_row();
        assert_eq!(row[1], "2");
        assert_eq!(row[2], "2021-01-03 15:25:36");
        assert_eq!(row[3], "7 seconds");
        assert_eq!(row[4], "2021-01-03 15:25:31");
        assert_eq!(row[8], "2021-01-03 15:25:41");
    }
}
