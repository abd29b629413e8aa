use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::data::Document;

mod lenient {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    use crate::{data::Value, normalize};

    fn cell<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(raw.and_then(Value::from_json))
    }

    pub fn object_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(normalize::decode_object_id(cell(deserializer)?.as_ref()).into_option())
    }

    pub fn reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(normalize::decode_reference(cell(deserializer)?.as_ref()).into_option())
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(normalize::decode_timestamp(cell(deserializer)?.as_ref()).into_option())
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(normalize::coerce_numeric(cell(deserializer)?.as_ref()))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match cell(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Integer(i)) => Some(i.to_string()),
            _ => None,
        })
    }

    pub fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<JsonValue>::deserialize(deserializer)?.filter(|value| !value.is_null()))
    }

    /// A list value stays `Some` even when empty; elements that are not
    /// objects become all-`None` items. A lone object is a one-item list.
    pub fn items<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned + Default,
    {
        Ok(match Option::<JsonValue>::deserialize(deserializer)? {
            Some(JsonValue::Array(values)) => Some(
                values
                    .into_iter()
                    .map(|value| serde_json::from_value(value).unwrap_or_default())
                    .collect(),
            ),
            Some(JsonValue::Object(map)) => Some(vec![
                serde_json::from_value(JsonValue::Object(map)).unwrap_or_default(),
            ]),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReceiptItem {
    #[serde(deserialize_with = "lenient::text")]
    pub barcode: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub brand_code: Option<String>,
    #[serde(deserialize_with = "lenient::present")]
    pub needs_fetch_review: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Receipt {
    #[serde(rename = "_id", deserialize_with = "lenient::object_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::object_id")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub create_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub finished_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub purchase_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_spent: Option<f64>,
    #[serde(deserialize_with = "lenient::items")]
    pub rewards_receipt_item_list: Option<Vec<ReceiptItem>>,
}

impl Receipt {
    pub fn items(&self) -> &[ReceiptItem] {
        self.rewards_receipt_item_list.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", deserialize_with = "lenient::object_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub sign_up_source: Option<String>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Brand {
    #[serde(rename = "_id", deserialize_with = "lenient::object_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub brand_code: Option<String>,
    #[serde(deserialize_with = "lenient::present")]
    pub top_brand: Option<JsonValue>,
    #[serde(deserialize_with = "lenient::reference")]
    pub cpg: Option<String>,
}

pub fn decode_all<T>(documents: &[Document]) -> serde_json::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    documents
        .iter()
        .map(|document| serde_json::from_value(JsonValue::Object(document.clone())))
        .collect()
}
