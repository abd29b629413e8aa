use std::collections::BTreeSet;

use anyhow::Result;
use log::info;

use crate::{cli::InfoArgs, data::Value, frame::Frame, pipeline, table};

pub const NULL_TYPE: &str = "null";
pub const MIXED_TYPE: &str = "mixed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub non_null: usize,
    pub null: usize,
    pub dtype: &'static str,
}

/// Integers mixed with floats widen to `float`; any other mixture is `mixed`.
pub fn infer_type<'a, I>(cells: I) -> &'static str
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    let observed = cells
        .into_iter()
        .flatten()
        .map(Value::type_name)
        .collect::<BTreeSet<_>>();
    match observed.len() {
        0 => NULL_TYPE,
        1 => observed.into_iter().next().unwrap_or(NULL_TYPE),
        2 if observed.contains("int") && observed.contains("float") => "float",
        _ => MIXED_TYPE,
    }
}

pub fn summarize(frame: &Frame) -> Vec<ColumnSummary> {
    frame
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let non_null = frame.column(idx).filter(Option::is_some).count();
            ColumnSummary {
                name: name.clone(),
                non_null,
                null: frame.rows.len() - non_null,
                dtype: infer_type(frame.column(idx)),
            }
        })
        .collect()
}

pub fn render_rows(summaries: &[ColumnSummary]) -> Vec<Vec<String>> {
    summaries
        .iter()
        .enumerate()
        .map(|(idx, summary)| {
            vec![
                idx.to_string(),
                summary.name.clone(),
                summary.non_null.to_string(),
                summary.null.to_string(),
                summary.dtype.to_string(),
            ]
        })
        .collect()
}

pub fn headers() -> Vec<String> {
    ["#", "column", "non-null", "null", "dtype"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn print_summary(frame: &Frame) {
    let (rows, columns) = frame.shape();
    println!("{rows} entries, {columns} columns");
    table::print_table(&headers(), &render_rows(&summarize(frame)));
}

pub fn execute(args: &InfoArgs) -> Result<()> {
    let (_, frame) = pipeline::load_source(&args.source)?;
    print_summary(&frame);
    info!(
        "Summarized {} column(s) of the {} view",
        frame.columns.len(),
        args.source.view.as_str()
    );
    Ok(())
}
