use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, frame::Frame, pipeline, table};

pub fn print_preview(frame: &Frame, rows: usize, max_width: usize) {
    let head = frame.head(rows);
    table::print_table(&head.columns, &table::frame_rows(&head, max_width));
    let (row_count, column_count) = frame.shape();
    println!("[{row_count} rows x {column_count} columns]");
}

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let (_, frame) = pipeline::load_source(&args.source)?;
    print_preview(&frame, args.rows, args.max_width);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        args.rows.min(frame.rows.len()),
        frame.rows.len(),
        args.source.input
    );
    Ok(())
}
