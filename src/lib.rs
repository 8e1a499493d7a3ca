pub mod analyze;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod decode;
pub mod frame;
pub mod frequency;
pub mod io_utils;
pub mod link;
pub mod metrics;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod schema;
pub mod series;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("errand_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Link(args) => link::execute(&args),
        Commands::Summary(args) => summary::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: Option<u8>) -> String {
    match delimiter {
        None => "auto".to_string(),
        Some(b'\t') => "\\t".to_string(),
        Some(other) => (other as char).to_string(),
    }
}
