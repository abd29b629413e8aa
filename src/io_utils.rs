use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::error::LoadError;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Name used for detected profiles: the file stem, or `stdin` for `-`.
pub fn source_name(path: &Path) -> &str {
    if is_dash(path) {
        return "stdin";
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("stdin")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    let mut buf = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .map_err(LoadError::Stdin)?;
    } else {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        BufReader::new(file)
            .read_to_end(&mut buf)
            .map_err(|source| LoadError::Open {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(buf)
}

pub fn decode_bytes(
    bytes: &[u8],
    encoding: &'static Encoding,
    path: &Path,
) -> Result<String, LoadError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(LoadError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn read_to_string(path: &Path, encoding: &'static Encoding) -> Result<String, LoadError> {
    let bytes = read_bytes(path)?;
    decode_bytes(&bytes, encoding, path)
}
