//! The `analyze` command: key metrics file, charts, and optional JSON dump.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    chart,
    cli::AnalyzeArgs,
    config::AnalysisConfig,
    io_utils,
    pipeline::Dataset,
    printable_delimiter,
    report::{self, Report},
};

pub const JSON_FILE: &str = "metrics.json";

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let config = effective_config(args)?;
    debug!("Analysis settings: {config:?}");
    info!(
        "Analyzing orders {:?} and errands {:?} (delimiter '{}')",
        args.input.orders,
        args.input.errands,
        printable_delimiter(args.input.delimiter)
    );

    let dataset = Dataset::from_args(&args.input)?;
    let linked = dataset.link();
    let report = report::build(&dataset.orders, &dataset.errands, &linked, &config);
    write_outputs(&report, &config, &args.output_dir)
}

/// Applies command-line overrides on top of the optional config file.
pub fn effective_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    if let Some(top) = args.top {
        config.top = top;
    }
    if args.no_charts {
        config.charts = false;
    }
    if args.json {
        config.json = true;
    }
    config.validate()?;
    Ok(config)
}

pub fn write_outputs(
    report: &Report,
    config: &AnalysisConfig,
    directory: &std::path::Path,
) -> Result<()> {
    io_utils::ensure_directory(directory)?;

    let metrics_path = directory.join(&config.metrics_file);
    io_utils::write_text(&metrics_path, &report.key_metrics.render())?;
    info!("Key metrics written to {metrics_path:?}");

    if config.charts {
        let written = chart::write_charts(&report.charts, directory)?;
        info!("Wrote {} chart(s) to {directory:?}", written.len());
    }

    if config.json {
        let json_path = directory.join(JSON_FILE);
        let body = serde_json::to_string_pretty(report).context("Serializing report to JSON")?;
        io_utils::write_text(&json_path, &body)?;
        info!("Report series written to {json_path:?}");
    }
    Ok(())
}
