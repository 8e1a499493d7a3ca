use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Link customer-service errands to orders and report contact metrics",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute key metrics and write them with one chart per metric
    Analyze(AnalyzeArgs),
    /// Write the errands joined to their orders as CSV
    Link(LinkArgs),
    /// Print key metrics and selected series as console tables
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Orders table (.csv, .tsv or .parquet)
    #[arg(long = "orders")]
    pub orders: PathBuf,
    /// Errands table (.csv, .tsv or .parquet)
    #[arg(long = "errands")]
    pub errands: PathBuf,
    /// CSV delimiter character for delimited inputs
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Directory receiving the metrics file and charts
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: PathBuf,
    /// YAML file with analysis settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Rows kept in top-N charts (overrides the config file)
    #[arg(long)]
    pub top: Option<usize>,
    /// Skip writing chart files
    #[arg(long = "no-charts")]
    pub no_charts: bool,
    /// Also write every series to metrics.json
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LinkArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// YAML file with analysis settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Print charts whose title contains this text (case-insensitive, repeatable)
    #[arg(long = "series", action = clap::ArgAction::Append)]
    pub series: Vec<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
