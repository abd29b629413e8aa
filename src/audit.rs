use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::AuditArgs,
    duplicates::{self, DuplicateReport},
    findings,
    frame::Frame,
    frequency::{self, DistinctOptions},
    io_utils,
    pipeline::{Dataset, FrameView, ProfileSelection},
    preview,
    profile::DatasetKind,
    stats, summary, table,
};

#[derive(Debug, Clone, Copy)]
pub struct AuditOptions {
    pub rows: usize,
    pub max_width: usize,
}

pub fn execute(args: &AuditArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let options = AuditOptions {
        rows: args.rows,
        max_width: args.max_width,
    };

    if let Some(dir) = &args.dir {
        let missing = DatasetKind::ALL
            .iter()
            .map(|kind| dir.join(kind.file_name()))
            .filter(|input| !input.is_file())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!("Missing export(s) in {dir:?}: {missing:?}");
        }
        for kind in DatasetKind::ALL {
            let input = dir.join(kind.file_name());
            let selection = ProfileSelection {
                dataset: Some(kind),
                profile: None,
            };
            let dataset = Dataset::load(&input, &selection, encoding)?;
            audit_dataset(&dataset, &options)
                .with_context(|| format!("Auditing {input:?}"))?;
        }
        info!("Audited {} dataset(s) in {:?}", DatasetKind::ALL.len(), dir);
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .unwrap_or_else(|| Path::new("-"));
    let selection = ProfileSelection {
        dataset: args.dataset,
        profile: args.profile.clone(),
    };
    let dataset = Dataset::load(input, &selection, encoding)?;
    audit_dataset(&dataset, &options).with_context(|| format!("Auditing {input:?}"))?;
    info!("Audited '{}' from {:?}", dataset.profile.name, input);
    Ok(())
}

pub fn audit_dataset(dataset: &Dataset, options: &AuditOptions) -> Result<()> {
    let profile = &dataset.profile;
    let name = profile.name.as_str();
    let records = dataset.view(FrameView::Records)?;

    table::print_section(&format!("{name}: preview"));
    preview::print_preview(&records, options.rows, options.max_width);

    table::print_section(&format!("{name}: columns"));
    summary::print_summary(&records);

    print_statistics(&format!("{name}: statistics"), &records);

    table::print_section(&format!("{name}: duplicate {}", profile.key));
    let report = DuplicateReport::for_column(&records, &profile.key)?;
    duplicates::print_report(&report);

    let categorical = frequency::present_columns(&records, &profile.categorical_fields);
    if !categorical.is_empty() {
        table::print_section(&format!("{name}: distinct values"));
        let rows =
            frequency::compute_distinct_rows(&records, &categorical, &DistinctOptions::default())?;
        table::print_table(&frequency::headers(), &rows);
    }

    let flatten = profile
        .flatten
        .as_ref()
        .filter(|spec| records.column_index(&spec.column).is_some());
    if let Some(spec) = flatten {
        let items = dataset.view(FrameView::Items)?;
        let joined = dataset.view(FrameView::Joined)?;
        table::print_section(&format!("{name}: {} items", spec.column));
        preview::print_preview(&items, options.rows, options.max_width);
        summary::print_summary(&items);
        print_statistics(&format!("{name}: item statistics"), &items);
        table::print_section(&format!("{name}: joined with {}", spec.column));
        let (rows, columns) = joined.shape();
        println!("[{rows} rows x {columns} columns]");
    }

    if let Some(kind) = profile.kind {
        table::print_section(&format!("{name}: findings"));
        let found = findings::findings_for(kind, &dataset.documents)?;
        table::print_table(&findings::headers(), &findings::render_rows(&found));
    }
    Ok(())
}

fn print_statistics(title: &str, frame: &Frame) {
    let columns = stats::eligible_columns(frame);
    if columns.is_empty() {
        return;
    }
    table::print_section(title);
    table::print_table(&stats::headers(), &stats::describe(frame, &columns));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_documents;

    fn receipts(text: &str) -> Dataset {
        let selection = ProfileSelection {
            dataset: Some(DatasetKind::Receipts),
            profile: None,
        };
        let documents = parse_documents(text).unwrap();
        Dataset::from_documents(Path::new("receipts.json"), documents, &selection).unwrap()
    }

    #[test]
    fn audit_skips_categorical_fields_absent_from_export() {
        let dataset = receipts(
            "{\"_id\":{\"$oid\":\"r1\"},\"rewardsReceiptItemList\":[{\"barcode\":\"1\"}]}\n",
        );
        let options = AuditOptions {
            rows: 5,
            max_width: 40,
        };
        assert!(audit_dataset(&dataset, &options).is_ok());
    }

    #[test]
    fn audit_skips_items_when_no_receipt_has_a_list() {
        let dataset =
            receipts("{\"_id\":{\"$oid\":\"r1\"},\"rewardsReceiptStatus\":\"FINISHED\"}\n");
        let options = AuditOptions {
            rows: 5,
            max_width: 40,
        };
        assert!(audit_dataset(&dataset, &options).is_ok());
    }
}
