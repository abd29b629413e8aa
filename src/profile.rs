//! Dataset profiles: which fields to unwrap, which list to flatten, which key
//! must be unique and which columns are categorical.
//!
//! The three exports this tool was written for ship as built-in presets. Any
//! other line-delimited export can be described in a YAML file:
//!
//! ```yaml
//! name: orders
//! key: _id
//! object_id_fields: [_id, customerId]
//! timestamp_fields: [createdAt]
//! numeric_fields: [total]
//! categorical_fields: [status]
//! flatten:
//!   column: lines
//!   parent_key_as: orderId
//!   numeric_fields: [price]
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    frame::Frame,
    normalize::{self, Decoded},
};

pub const DEFAULT_KEY: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum DatasetKind {
    Receipts,
    Users,
    Brands,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Receipts, DatasetKind::Users, DatasetKind::Brands];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Receipts => "receipts",
            DatasetKind::Users => "users",
            DatasetKind::Brands => "brands",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Recognizes `receipts.json`, `users.ndjson` and similar file names.
    pub fn from_path(path: &Path) -> Option<DatasetKind> {
        let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
        DatasetKind::ALL
            .into_iter()
            .find(|kind| stem == kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenSpec {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key_as: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numeric_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timestamp_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DatasetKind>,
    #[serde(default = "Profile::default_key")]
    pub key: String,
    #[serde(default)]
    pub object_id_fields: Vec<String>,
    #[serde(default)]
    pub timestamp_fields: Vec<String>,
    #[serde(default)]
    pub reference_fields: Vec<String>,
    #[serde(default)]
    pub numeric_fields: Vec<String>,
    #[serde(default)]
    pub categorical_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten: Option<FlattenSpec>,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Profile {
    fn default_key() -> String {
        DEFAULT_KEY.to_string()
    }

    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: None,
            key: Self::default_key(),
            object_id_fields: Vec::new(),
            timestamp_fields: Vec::new(),
            reference_fields: Vec::new(),
            numeric_fields: Vec::new(),
            categorical_fields: Vec::new(),
            flatten: None,
        }
    }

    pub fn preset(kind: DatasetKind) -> Self {
        let mut profile = Self::empty(kind.as_str());
        profile.kind = Some(kind);
        match kind {
            DatasetKind::Receipts => {
                profile.object_id_fields = names(&["_id", "userId"]);
                profile.timestamp_fields = names(&[
                    "createDate",
                    "dateScanned",
                    "finishedDate",
                    "modifyDate",
                    "pointsAwardedDate",
                    "purchaseDate",
                ]);
                profile.numeric_fields = names(&[
                    "bonusPointsEarned",
                    "pointsEarned",
                    "purchasedItemCount",
                    "totalSpent",
                ]);
                profile.categorical_fields = names(&["rewardsReceiptStatus"]);
                profile.flatten = Some(FlattenSpec {
                    column: "rewardsReceiptItemList".to_string(),
                    parent_key_as: Some("receiptId".to_string()),
                    numeric_fields: names(&[
                        "discountedItemPrice",
                        "finalPrice",
                        "itemPrice",
                        "originalFinalPrice",
                        "originalMetaBriteItemPrice",
                        "originalMetaBriteQuantityPurchased",
                        "pointsEarned",
                        "priceAfterCoupon",
                        "quantityPurchased",
                        "targetPrice",
                        "userFlaggedPrice",
                        "userFlaggedQuantity",
                    ]),
                    timestamp_fields: Vec::new(),
                });
            }
            DatasetKind::Users => {
                profile.object_id_fields = names(&["_id"]);
                profile.timestamp_fields = names(&["createdDate", "lastLogin"]);
                profile.categorical_fields = names(&["role", "state", "signUpSource"]);
            }
            DatasetKind::Brands => {
                profile.object_id_fields = names(&["_id"]);
                profile.reference_fields = names(&["cpg"]);
                profile.categorical_fields = names(&["category", "categoryCode"]);
            }
        }
        profile
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile file {path:?}"))?;
        let reader = BufReader::new(file);
        let profile: Profile = serde_yaml::from_reader(reader).context("Parsing profile YAML")?;
        if profile.key.trim().is_empty() {
            return Err(anyhow!("Profile '{}' has an empty key column", profile.name));
        }
        Ok(profile)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing profile to YAML string")
    }

    /// Builds a profile for an unknown export by looking for wrapper objects:
    /// a column counts as an identifier or timestamp column when any of its
    /// values is the matching wrapper.
    pub fn detect(name: &str, frame: &Frame) -> Self {
        let mut profile = Self::empty(name);
        for (idx, column) in frame.columns.iter().enumerate() {
            let mut cells = frame.column(idx).filter(|cell| matches!(cell, Some(Value::Object(_))));
            let found = cells.find_map(|cell| {
                if !normalize::decode_object_id(cell).is_absent() {
                    Some(normalize::FieldKind::ObjectId)
                } else if matches!(normalize::decode_timestamp(cell), Decoded::Wrapped(_)) {
                    Some(normalize::FieldKind::Timestamp)
                } else if !normalize::decode_reference(cell).is_absent() {
                    Some(normalize::FieldKind::Reference)
                } else {
                    None
                }
            });
            match found {
                Some(normalize::FieldKind::ObjectId) => profile.object_id_fields.push(column.clone()),
                Some(normalize::FieldKind::Timestamp) => profile.timestamp_fields.push(column.clone()),
                Some(normalize::FieldKind::Reference) => profile.reference_fields.push(column.clone()),
                _ => {}
            }
        }
        debug!(
            "Detected {} identifier, {} timestamp and {} reference column(s) in '{}'",
            profile.object_id_fields.len(),
            profile.timestamp_fields.len(),
            profile.reference_fields.len(),
            name
        );
        profile
    }
}
