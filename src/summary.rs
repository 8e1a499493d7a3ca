//! The `summary` command: key metrics and selected series as console tables.

use anyhow::Result;
use log::{info, warn};

use crate::{
    cli::SummaryArgs,
    config::AnalysisConfig,
    pipeline::Dataset,
    report::{self, Report},
    table,
};

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let dataset = Dataset::from_args(&args.input)?;
    let linked = dataset.link();
    let report = report::build(&dataset.orders, &dataset.errands, &linked, &config);
    print!("{}", render(&report, &args.series));
    Ok(())
}

/// Key metrics table followed by every chart whose title matches a filter.
pub fn render(report: &Report, filters: &[String]) -> String {
    let mut output = table::render_key_metrics(&report.key_metrics);
    for filter in filters {
        let needle = filter.to_lowercase();
        let matches = report
            .charts
            .iter()
            .filter(|chart| chart.title.to_lowercase().contains(&needle))
            .collect::<Vec<_>>();
        if matches.is_empty() {
            warn!("No chart title matches '{filter}'");
            continue;
        }
        for chart in matches {
            info!("Printing series '{}'", chart.title);
            for series in &chart.series {
                let header = if chart.x_label.is_empty() {
                    "label"
                } else {
                    chart.x_label.as_str()
                };
                output.push('\n');
                if chart.series.len() > 1 {
                    output.push_str(&format!("{} [{}]\n", chart.title, series.name));
                } else {
                    output.push_str(&format!("{}\n", chart.title));
                }
                output.push_str(&table::render_series(header, series));
            }
        }
    }
    output
}
