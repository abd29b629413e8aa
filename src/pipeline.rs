use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    cli::SourceArgs,
    data::Document,
    error::FrameError,
    flatten,
    frame::Frame,
    io_utils, loader,
    normalize::{FieldKind, normalize_fields},
    profile::{DatasetKind, Profile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum FrameView {
    /// One row per document, wrapper fields normalized
    #[default]
    Records,
    /// One row per list element joined with its parent's other columns
    Joined,
    /// List elements only
    Items,
}

impl FrameView {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameView::Records => "records",
            FrameView::Joined => "joined",
            FrameView::Items => "items",
        }
    }
}

/// How the profile for an input is chosen: an explicit YAML file wins, then an
/// explicit dataset kind, then the file name, then wrapper detection.
#[derive(Debug, Clone, Default)]
pub struct ProfileSelection {
    pub dataset: Option<DatasetKind>,
    pub profile: Option<PathBuf>,
}

impl ProfileSelection {
    pub fn resolve(&self, input: &Path, records: &Frame) -> Result<Profile> {
        if let Some(path) = &self.profile {
            return Profile::load(path).with_context(|| format!("Loading profile from {path:?}"));
        }
        if let Some(kind) = self.dataset.or_else(|| DatasetKind::from_path(input)) {
            return Ok(Profile::preset(kind));
        }
        Ok(Profile::detect(io_utils::source_name(input), records))
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub profile: Profile,
    pub documents: Vec<Document>,
    pub records: Frame,
}

pub fn apply_profile(frame: &mut Frame, profile: &Profile) {
    normalize_fields(frame, &profile.object_id_fields, FieldKind::ObjectId);
    normalize_fields(frame, &profile.timestamp_fields, FieldKind::Timestamp);
    normalize_fields(frame, &profile.reference_fields, FieldKind::Reference);
    normalize_fields(frame, &profile.numeric_fields, FieldKind::Numeric);
}

impl Dataset {
    pub fn from_documents(
        input: &Path,
        documents: Vec<Document>,
        selection: &ProfileSelection,
    ) -> Result<Self> {
        let mut records = Frame::from_documents(&documents);
        let profile = selection.resolve(input, &records)?;
        apply_profile(&mut records, &profile);
        debug!(
            "Normalized {} record(s) of '{}' across {} column(s)",
            records.rows.len(),
            profile.name,
            records.columns.len()
        );
        Ok(Self {
            profile,
            documents,
            records,
        })
    }

    pub fn load(
        input: &Path,
        selection: &ProfileSelection,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let documents = loader::load_documents(input, encoding)
            .with_context(|| format!("Loading documents from {input:?}"))?;
        let dataset = Self::from_documents(input, documents, selection)?;
        info!(
            "Loaded {} document(s) from {:?} as '{}'",
            dataset.documents.len(),
            input,
            dataset.profile.name
        );
        Ok(dataset)
    }

    pub fn view(&self, view: FrameView) -> Result<Frame> {
        let items_only = match view {
            FrameView::Records => return Ok(self.records.clone()),
            FrameView::Joined => false,
            FrameView::Items => true,
        };
        let spec = self
            .profile
            .flatten
            .as_ref()
            .ok_or_else(|| FrameError::NothingToFlatten(self.profile.name.clone()))?;
        let mut exploded = flatten::explode_column(&self.records, &spec.column)
            .with_context(|| format!("Flattening '{}'", spec.column))?;
        normalize_fields(&mut exploded.items, &spec.timestamp_fields, FieldKind::Timestamp);
        normalize_fields(&mut exploded.items, &spec.numeric_fields, FieldKind::Numeric);
        let frame = if items_only {
            let parent_key = spec
                .parent_key_as
                .as_deref()
                .map(|alias| (self.profile.key.as_str(), alias));
            exploded.into_items(&self.records, parent_key)?
        } else {
            exploded.join(&self.records)?
        };
        debug!(
            "Flattened '{}' into {} {} row(s)",
            spec.column,
            frame.rows.len(),
            view.as_str()
        );
        Ok(frame)
    }
}

/// Loads the dataset named by command-line source arguments and builds the
/// requested view.
pub fn load_source(source: &SourceArgs) -> Result<(Dataset, Frame)> {
    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    let dataset = Dataset::load(&source.input, &source.selection(), encoding)?;
    let frame = dataset.view(source.view)?;
    Ok((dataset, frame))
}
