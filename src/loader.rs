use std::path::Path;

use encoding_rs::Encoding;
use log::debug;
use serde_json::Value as JsonValue;

use crate::{
    data::{Document, json_type_name},
    error::LoadError,
    io_utils,
};

pub fn load_documents(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<Vec<Document>, LoadError> {
    let text = io_utils::read_to_string(path, encoding)?;
    let documents = parse_documents(&text)?;
    debug!("Parsed {} document(s) from {:?}", documents.len(), path);
    Ok(documents)
}

pub fn parse_documents(text: &str) -> Result<Vec<Document>, LoadError> {
    let mut documents = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line_number = idx + 1;
        let parsed: JsonValue =
            serde_json::from_str(trimmed).map_err(|source| LoadError::InvalidJson {
                line: line_number,
                source,
            })?;
        match parsed {
            JsonValue::Object(map) => documents.push(map),
            other => {
                return Err(LoadError::NotAnObject {
                    line: line_number,
                    found: json_type_name(&other),
                });
            }
        }
    }
    Ok(documents)
}
