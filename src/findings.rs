//! Domain checks over the typed receipt, user and brand records.
//!
//! Each finding counts the records that break an expectation the data is
//! supposed to meet. Nothing is corrected; the counts are for review.

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use crate::{
    data::Document,
    duplicates::DuplicateReport,
    models::{self, Brand, Receipt, ReceiptItem, User},
    profile::DatasetKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: &'static str,
    pub affected: usize,
    pub total: usize,
}

impl Finding {
    fn count<T>(check: &'static str, records: &[T], predicate: impl Fn(&T) -> bool) -> Self {
        Self {
            check,
            affected: records.iter().filter(|record| predicate(*record)).count(),
            total: records.len(),
        }
    }

    fn duplicate_ids<'a>(ids: impl Iterator<Item = Option<&'a str>>) -> Self {
        let report = DuplicateReport::from_keys("_id", ids);
        Self {
            check: "duplicate _id",
            affected: report.duplicated,
            total: report.total,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|text| text.trim().is_empty())
}

fn is_non_boolean(value: &Option<JsonValue>) -> bool {
    matches!(value, Some(v) if !v.is_boolean())
}

pub fn receipt_findings(receipts: &[Receipt]) -> Vec<Finding> {
    let items = receipts
        .iter()
        .flat_map(|receipt| receipt.items().iter().cloned())
        .collect::<Vec<ReceiptItem>>();
    vec![
        Finding::duplicate_ids(receipts.iter().map(|r| r.id.as_deref())),
        Finding::count("receipt without items", receipts, |r| r.items().is_empty()),
        Finding::count("createDate without finishedDate", receipts, |r| {
            r.create_date.is_some() && r.finished_date.is_none()
        }),
        Finding::count("missing userId", receipts, |r| is_blank(&r.user_id)),
        Finding::count("missing totalSpent", receipts, |r| r.total_spent.is_none()),
        Finding::count("missing purchaseDate", receipts, |r| r.purchase_date.is_none()),
        Finding::count("item missing barcode", &items, |i| is_blank(&i.barcode)),
        Finding::count("item missing brandCode", &items, |i| is_blank(&i.brand_code)),
        Finding::count("item needsFetchReview not boolean", &items, |i| {
            is_non_boolean(&i.needs_fetch_review)
        }),
    ]
}

pub fn user_findings(users: &[User]) -> Vec<Finding> {
    vec![
        Finding::duplicate_ids(users.iter().map(|u| u.id.as_deref())),
        Finding::count("missing lastLogin", users, |u| u.last_login.is_none()),
        Finding::count("missing signUpSource", users, |u| is_blank(&u.sign_up_source)),
    ]
}

pub fn brand_findings(brands: &[Brand]) -> Vec<Finding> {
    vec![
        Finding::duplicate_ids(brands.iter().map(|b| b.id.as_deref())),
        Finding::count("missing brandCode", brands, |b| is_blank(&b.brand_code)),
        Finding::count("missing category", brands, |b| is_blank(&b.category)),
        Finding::count("missing cpg reference", brands, |b| is_blank(&b.cpg)),
        Finding::count("topBrand not boolean", brands, |b| is_non_boolean(&b.top_brand)),
    ]
}

pub fn findings_for(kind: DatasetKind, documents: &[Document]) -> Result<Vec<Finding>> {
    let findings = match kind {
        DatasetKind::Receipts => receipt_findings(
            &models::decode_all::<Receipt>(documents).context("Decoding receipts")?,
        ),
        DatasetKind::Users => {
            user_findings(&models::decode_all::<User>(documents).context("Decoding users")?)
        }
        DatasetKind::Brands => {
            brand_findings(&models::decode_all::<Brand>(documents).context("Decoding brands")?)
        }
    };
    Ok(findings)
}

pub fn headers() -> Vec<String> {
    ["check", "affected", "total", "percent"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn render_rows(findings: &[Finding]) -> Vec<Vec<String>> {
    findings
        .iter()
        .map(|finding| {
            let percent = if finding.total == 0 {
                String::new()
            } else {
                format!("{:.2}%", finding.affected as f64 / finding.total as f64 * 100.0)
            };
            vec![
                finding.check.to_string(),
                finding.affected.to_string(),
                finding.total.to_string(),
                percent,
            ]
        })
        .collect()
}
