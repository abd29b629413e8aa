pub mod audit;
pub mod cli;
pub mod data;
pub mod duplicates;
pub mod error;
pub mod findings;
pub mod flatten;
pub mod frame;
pub mod frequency;
pub mod io_utils;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod preview;
pub mod profile;
pub mod stats;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    frame::Frame,
    profile::Profile,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("docaudit", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command: {:?}", cli.command);
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Info(args) => summary::execute(&args),
        Commands::Describe(args) => stats::execute(&args),
        Commands::Duplicates(args) => duplicates::execute(&args),
        Commands::Distinct(args) => frequency::execute(&args),
        Commands::Audit(args) => audit::execute(&args),
        Commands::Profile(args) => handle_profile(&args),
    }
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let profile = match (&args.input, args.dataset) {
        (Some(input), _) => {
            let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
            let documents = loader::load_documents(input, encoding)
                .with_context(|| format!("Loading documents from {input:?}"))?;
            Profile::detect(io_utils::source_name(input), &Frame::from_documents(&documents))
        }
        (None, Some(kind)) => Profile::preset(kind),
        (None, None) => anyhow::bail!("Supply --dataset or --input to choose a profile"),
    };
    print!("{}", profile.to_yaml_string()?);
    info!("Printed profile '{}'", profile.name);
    Ok(())
}
