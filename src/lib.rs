pub mod aggregate;
pub mod cli;
pub mod combine;
pub mod data;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod join;
pub mod manifest;
pub mod merge;
pub mod preview;
pub mod reshape;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("country_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => merge::execute(&args),
        Commands::Manifest(args) => handle_manifest(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

fn handle_manifest(args: &cli::ManifestArgs) -> Result<()> {
    let manifest = manifest::Manifest::default();
    match &args.output {
        Some(path) => {
            manifest
                .save(path)
                .with_context(|| format!("Writing manifest template to {path:?}"))?;
            info!("Wrote manifest template to {path:?}");
        }
        None => {
            print!("{}", manifest.to_yaml()?);
        }
    }
    Ok(())
}
