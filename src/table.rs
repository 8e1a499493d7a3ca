//! Plain-text tables for printing metrics and series to the console.

use std::fmt::Write as _;

use crate::{metrics::KeyMetrics, series::Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[&str], aligns: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize(cell).chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, aligns));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(output, "{separator}");
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let text = sanitize(value);
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{text:<width$}"),
                Align::Right => format!("{text:>width$}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn sanitize(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

pub fn render_key_metrics(metrics: &KeyMetrics) -> String {
    let mut rows = metrics
        .entries()
        .iter()
        .map(|(label, value)| vec![label.to_string(), format!("{value:.2}%")])
        .collect::<Vec<_>>();
    rows.push(vec!["Orders".to_string(), metrics.orders.to_string()]);
    rows.push(vec!["Errands".to_string(), metrics.errands.to_string()]);
    rows.push(vec!["Linked contacts".to_string(), metrics.linked.to_string()]);
    render_table(&["metric", "value"], &[Align::Left, Align::Right], &rows)
}

/// Renders a series with each value's share of the series total.
pub fn render_series(label_header: &str, series: &Series) -> String {
    let total = series.total();
    let rows = series
        .points
        .iter()
        .map(|point| {
            let share = crate::data::percentage(point.value, total);
            vec![
                point.label.clone(),
                format_number(point.value),
                format!("{share:.2}%"),
            ]
        })
        .collect::<Vec<_>>();
    render_table(
        &[label_header, "value", "share"],
        &[Align::Left, Align::Right, Align::Right],
        &rows,
    )
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
