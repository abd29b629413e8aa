use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    pipeline::{FrameView, ProfileSelection},
    profile::DatasetKind,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Audit line-delimited JSON exports for data-quality issues",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the first rows and the shape of a normalized dataset
    Preview(PreviewArgs),
    /// Summarize every column: non-null count, null count and inferred type
    Info(InfoArgs),
    /// Produce descriptive statistics for numeric and date-time columns
    Describe(DescribeArgs),
    /// Count duplicated and unique values of a key column
    Duplicates(DuplicatesArgs),
    /// List the distinct values of categorical columns
    Distinct(DistinctArgs),
    /// Run the full data-quality report for one dataset or a directory of exports
    Audit(AuditArgs),
    /// Print a dataset profile as YAML, ready to be edited and passed to --profile
    Profile(ProfileArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Line-delimited JSON file to read ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Built-in dataset profile (defaults to the one matching the file name)
    #[arg(short = 'd', long = "dataset", value_enum)]
    pub dataset: Option<DatasetKind>,
    /// YAML profile describing the fields to normalize
    #[arg(short = 'p', long = "profile", conflicts_with = "dataset")]
    pub profile: Option<PathBuf>,
    /// Which table to report on
    #[arg(long = "view", value_enum, default_value = "records")]
    pub view: FrameView,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl SourceArgs {
    pub fn selection(&self) -> ProfileSelection {
        ProfileSelection {
            dataset: self.dataset,
            profile: self.profile.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
    /// Truncate cells wider than this many characters (0 disables truncation)
    #[arg(long = "max-width", default_value_t = 40)]
    pub max_width: usize,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Columns to include (defaults to every numeric and date-time column)
    #[arg(short = 'C', long = "columns", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Key column to check (defaults to the profile key)
    #[arg(short = 'k', long = "key")]
    pub key: Option<String>,
}

#[derive(Debug, Args)]
pub struct DistinctArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Columns to list (defaults to the profile's categorical columns)
    #[arg(short = 'C', long = "columns", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Maximum distinct values to display per column (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Order values by descending count instead of first appearance
    #[arg(long = "by-count")]
    pub by_count: bool,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Line-delimited JSON file to audit
    #[arg(short = 'i', long = "input", required_unless_present = "dir", conflicts_with = "dir")]
    pub input: Option<PathBuf>,
    /// Directory holding receipts.json, users.json and brands.json
    #[arg(long = "dir")]
    pub dir: Option<PathBuf>,
    /// Built-in dataset profile (defaults to the one matching the file name)
    #[arg(short = 'd', long = "dataset", value_enum, conflicts_with = "dir")]
    pub dataset: Option<DatasetKind>,
    /// YAML profile describing the fields to normalize
    #[arg(short = 'p', long = "profile", conflicts_with_all = ["dataset", "dir"])]
    pub profile: Option<PathBuf>,
    /// Number of preview rows per table
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
    /// Truncate cells wider than this many characters (0 disables truncation)
    #[arg(long = "max-width", default_value_t = 40)]
    pub max_width: usize,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Built-in profile to print
    #[arg(short = 'd', long = "dataset", value_enum, required_unless_present = "input")]
    pub dataset: Option<DatasetKind>,
    /// Detect a profile from the wrapper objects found in this file instead
    #[arg(short = 'i', long = "input", conflicts_with = "dataset")]
    pub input: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
