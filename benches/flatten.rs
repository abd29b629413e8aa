use std::path::Path;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use docaudit::data::Document;
use docaudit::flatten::explode_column;
use docaudit::frame::Frame;
use docaudit::loader::parse_documents;
use docaudit::pipeline::{Dataset, FrameView, ProfileSelection};
use docaudit::profile::DatasetKind;

fn generate_receipts(rows: usize) -> Vec<Document> {
    let mut text = String::new();
    for i in 0..rows {
        let items = (0..i % 5)
            .map(|n| {
                format!(
                    "{{\"barcode\":\"{i}{n:03}\",\"finalPrice\":\"{}.{:02}\",\"quantityPurchased\":{}}}",
                    n + 1,
                    i % 100,
                    n % 3 + 1
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        text.push_str(&format!(
            "{{\"_id\":{{\"$oid\":\"{i:024x}\"}},\"createDate\":{{\"$date\":{}}},\"totalSpent\":\"{}.00\",\"rewardsReceiptItemList\":[{items}]}}\n",
            1_609_687_531_000i64 + i as i64 * 1000,
            i % 250
        ));
    }
    parse_documents(&text).expect("generated receipts parse")
}

fn bench_flatten(c: &mut Criterion) {
    let documents = generate_receipts(20_000);
    let selection = ProfileSelection {
        dataset: Some(DatasetKind::Receipts),
        profile: None,
    };
    let dataset = Dataset::from_documents(Path::new("receipts.json"), documents.clone(), &selection)
        .expect("dataset");

    let mut group = c.benchmark_group("receipts");
    group.bench_function("normalize_records", |b| {
        b.iter_batched(
            || documents.clone(),
            |documents| {
                Dataset::from_documents(Path::new("receipts.json"), documents, &selection)
                    .expect("dataset")
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("explode_items", |b| {
        b.iter(|| {
            explode_column(&dataset.records, "rewardsReceiptItemList").expect("explode")
        });
    });
    group.bench_function("joined_view", |b| {
        b.iter(|| dataset.view(FrameView::Joined).expect("joined view"));
    });
    group.bench_function("frame_from_documents", |b| {
        b.iter(|| Frame::from_documents(&documents));
    });
    group.finish();
}

criterion_group!(benches, bench_flatten);
criterion_main!(benches);
