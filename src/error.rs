use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Opening input file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Reading standard input")]
    Stdin(#[source] io::Error),
    #[error("Failed to decode {path:?} with encoding {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("Line {line}: invalid JSON")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {line}: expected a JSON object but found {found}")]
    NotAnObject { line: usize, found: &'static str },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Profile '{0}' does not define a list column to flatten")]
    NothingToFlatten(String),
}
