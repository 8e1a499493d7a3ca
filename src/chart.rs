//! SVG rendering for report charts.
//!
//! Each chart becomes one SVG document named after its title, drawn with
//! `plotters` on its SVG backend. Bar and stacked-bar charts place one
//! segment per label on the x axis; pie charts draw each positive value as a
//! slice.

use std::{
    ops::Range,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use log::{debug, info};
use plotters::{
    coord::{
        Shift,
        ranged1d::SegmentedCoord,
        types::{RangedCoordf64, RangedCoordusize},
    },
    prelude::*,
};
use regex::Regex;

use crate::{
    io_utils,
    report::{Chart, ChartKind},
    series::Series,
};

const SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";
const PALETTE: &[RGBColor] = &[
    RGBColor(0xa1, 0xc9, 0xf4),
    RGBColor(0xff, 0xb4, 0x82),
    RGBColor(0x8d, 0xe5, 0xa1),
    RGBColor(0xff, 0x9f, 0x9b),
    RGBColor(0xd0, 0xbb, 0xff),
    RGBColor(0xde, 0xbb, 0x9b),
    RGBColor(0xfa, 0xb0, 0xe4),
    RGBColor(0xcf, 0xcf, 0xcf),
    RGBColor(0xff, 0xfe, 0xa3),
    RGBColor(0xb9, 0xf2, 0xf0),
];

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type LabelAxes = Cartesian2d<SegmentedCoord<RangedCoordusize>, RangedCoordf64>;

static UNSAFE_FILE_CHARS: OnceLock<Regex> = OnceLock::new();

/// Maps a chart title to a file name, replacing characters that are not
/// allowed in paths on common platforms.
pub fn file_name(title: &str) -> String {
    let pattern = UNSAFE_FILE_CHARS
        .get_or_init(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("valid file name pattern"));
    let cleaned = pattern.replace_all(title.trim(), "_");
    if cleaned.is_empty() {
        "chart.svg".to_string()
    } else {
        format!("{cleaned}.svg")
    }
}

pub fn write_charts(charts: &[Chart], directory: &Path) -> Result<Vec<PathBuf>> {
    io_utils::ensure_directory(directory)?;
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = directory.join(file_name(&chart.title));
        let svg = render(chart).with_context(|| format!("Rendering chart '{}'", chart.title))?;
        io_utils::write_text(&path, &svg)?;
        debug!("Wrote chart '{}' to {:?}", chart.title, path);
        written.push(path);
    }
    info!("Wrote {} chart(s) to {:?}", written.len(), directory);
    Ok(written)
}

/// Renders one chart into an SVG document.
pub fn render(chart: &Chart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        if chart.series.iter().all(Series::is_empty) {
            draw_placeholder(&root, chart)?;
        } else {
            match chart.kind {
                ChartKind::Bar => draw_bars(&root, chart)?,
                ChartKind::StackedBar => draw_stacked(&root, chart)?,
                ChartKind::Pie => draw_pie(&root, chart)?,
            }
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_placeholder(root: &Area<'_>, chart: &Chart) -> Result<()> {
    let area = root.titled(&chart.title, (FONT, 24))?;
    let (width, height) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data",
        (width as i32 / 2 - 30, height as i32 / 2),
        (FONT, 16).into_font().color(&RGBColor(0x80, 0x80, 0x80)),
    ))?;
    Ok(())
}

fn draw_bars(root: &Area<'_>, chart: &Chart) -> Result<()> {
    let Some(series) = chart.primary() else {
        return Ok(());
    };
    let labels = series.labels().collect::<Vec<_>>();
    let color = named_color(chart.color);

    let mut plot = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(if chart.label_rotation == 0 { 50 } else { 140 })
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..labels.len()).into_segmented(),
            value_range(series.points.iter().map(|p| p.value)),
        )?;
    configure_mesh(&mut plot, chart, &labels)?;
    plot.draw_series(series.points.iter().enumerate().map(|(idx, point)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(idx), 0.0),
                (SegmentValue::Exact(idx + 1), point.value),
            ],
            color.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;
    Ok(())
}

/// Stacks every series on the label axis of the first one.
fn draw_stacked(root: &Area<'_>, chart: &Chart) -> Result<()> {
    let Some(first) = chart.primary() else {
        return Ok(());
    };
    let labels = first.labels().collect::<Vec<_>>();
    if labels.is_empty() {
        return draw_placeholder(root, chart);
    }
    let totals = labels
        .iter()
        .map(|label| {
            chart
                .series
                .iter()
                .filter_map(|s| s.get(label))
                .filter(|v| *v > 0.0)
                .sum::<f64>()
        })
        .collect::<Vec<_>>();

    let mut plot = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(140)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..labels.len()).into_segmented(),
            value_range(totals.iter().copied()),
        )?;
    configure_mesh(&mut plot, chart, &labels)?;

    let mut bases = vec![0.0; labels.len()];
    for (series_idx, series) in chart.series.iter().enumerate() {
        let color = PALETTE[series_idx % PALETTE.len()];
        let mut segments = Vec::new();
        for (idx, label) in labels.iter().enumerate() {
            let value = series.get(label).unwrap_or(0.0);
            if value <= 0.0 {
                continue;
            }
            let mut segment = Rectangle::new(
                [
                    (SegmentValue::Exact(idx), bases[idx]),
                    (SegmentValue::Exact(idx + 1), bases[idx] + value),
                ],
                color.filled(),
            );
            segment.set_margin(0, 0, 6, 6);
            segments.push(segment);
            bases[idx] += value;
        }
        plot.draw_series(segments)?
            .label(series.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 12))
        .draw()?;
    Ok(())
}

fn draw_pie(root: &Area<'_>, chart: &Chart) -> Result<()> {
    let Some(series) = chart.primary() else {
        return Ok(());
    };
    let slices = series
        .points
        .iter()
        .filter(|p| p.value > 0.0)
        .collect::<Vec<_>>();
    let area = root.titled(&chart.title, (FONT, 24))?;
    if slices.is_empty() {
        return Ok(());
    }
    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(height.min(width)) * 0.38;
    let sizes = slices.iter().map(|p| p.value).collect::<Vec<_>>();
    let labels = slices.iter().map(|p| p.label.clone()).collect::<Vec<_>>();
    let colors = pie_colors(chart, slices.len());

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style((FONT, 14).into_font().color(&BLACK));
    pie.percentages((FONT, 12).into_font().color(&BLACK));
    area.draw(&pie)?;
    Ok(())
}

fn configure_mesh<DB>(
    plot: &mut ChartContext<'_, DB, LabelAxes>,
    chart: &Chart,
    labels: &[&str],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let label_font = if chart.label_rotation == 0 {
        (FONT, 12).into_font()
    } else {
        // plotters only rotates text in quarter turns.
        (FONT, 12).into_font().transform(FontTransform::Rotate90)
    };
    let x_formatter = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(idx) => labels
            .get(*idx)
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let y_formatter = |value: &f64| format_value(*value);
    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&x_formatter)
        .x_label_style(label_font)
        .y_label_formatter(&y_formatter)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style((FONT, 14))
        .draw()?;
    Ok(())
}

/// Vertical range covering zero and every value, with headroom on top.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let top = if max > 0.0 { max * 1.05 } else { 1.0 };
    let bottom = if min < 0.0 { min * 1.05 } else { 0.0 };
    bottom..top
}

fn named_color(name: &str) -> RGBColor {
    match name {
        "green" => RGBColor(0x00, 0x80, 0x00),
        "orange" => RGBColor(0xff, 0xa5, 0x00),
        "purple" => RGBColor(0x80, 0x00, 0x80),
        "teal" => RGBColor(0x00, 0x80, 0x80),
        "red" => RED,
        _ => BLUE,
    }
}

/// Two-slice pies with a non-default colour use that colour and blue, like
/// the contact/no-contact chart; everything else uses the palette.
fn pie_colors(chart: &Chart, count: usize) -> Vec<RGBColor> {
    if chart.color != "blue" && count == 2 {
        vec![named_color(chart.color), BLUE]
    } else {
        (0..count).map(|idx| PALETTE[idx % PALETTE.len()]).collect()
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn chart(kind: ChartKind, series: Vec<Series>) -> Chart {
        Chart {
            title: "Top 10 Routes".to_string(),
            x_label: "Route".to_string(),
            y_label: "Interaction Rate (%)".to_string(),
            kind,
            color: "purple",
            label_rotation: 15,
            series,
        }
    }

    #[test]
    fn file_name_replaces_path_characters() {
        assert_eq!(
            file_name("Top 10 Errand Actions"),
            "Top 10 Errand Actions.svg"
        );
        assert_eq!(file_name("a/b: c?"), "a_b_ c_.svg");
        assert_eq!(file_name("  "), "chart.svg");
    }

    #[test]
    fn bar_chart_carries_title_and_axis_descriptions() {
        let series = Series::from_pairs("rate", [("Sweden", 50.0), ("Finland", 25.0)]);
        let svg = render(&chart(ChartKind::Bar, vec![series])).expect("render");
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Top 10 Routes"));
        assert!(svg.contains("Interaction Rate (%)"));
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let svg = render(&chart(ChartKind::Bar, vec![Series::new("rate", Vec::new())]))
            .expect("render");
        assert!(svg.contains("No data"));
        let svg = render(&chart(ChartKind::StackedBar, Vec::new())).expect("render");
        assert!(svg.contains("No data"));
    }

    #[test]
    fn pie_chart_skips_non_positive_slices() {
        let series = Series::from_pairs("orders", [("No Contact", -50.0), ("With Contact", 150.0)]);
        let svg = render(&chart(ChartKind::Pie, vec![series])).expect("render");
        assert!(svg.contains("With Contact"));
        assert!(!svg.contains("No Contact"));
    }

    #[test]
    fn stacked_chart_labels_each_series() {
        let se = Series::from_pairs("Sweden", [("Delivery", 2.0), ("Refund", 0.0)]);
        let fi = Series::from_pairs("Finland", [("Delivery", 1.0), ("Refund", 3.0)]);
        let svg = render(&chart(ChartKind::StackedBar, vec![se, fi])).expect("render");
        assert!(svg.contains("Sweden"));
        assert!(svg.contains("Finland"));
    }

    #[test]
    fn value_range_includes_zero_and_negatives() {
        let range = value_range([2.0, 4.0].into_iter());
        assert_eq!(range.start, 0.0);
        assert!((range.end - 4.2).abs() < 1e-9);
        assert_eq!(value_range(std::iter::empty()), 0.0..1.0);
        let range = value_range([-10.0, 5.0].into_iter());
        assert!(range.start < -10.0 && range.end > 5.0);
    }

    #[test]
    fn contact_pie_pairs_chart_colour_with_blue() {
        let pie = Chart {
            color: "green",
            ..chart(ChartKind::Pie, Vec::new())
        };
        assert_eq!(pie_colors(&pie, 2), vec![named_color("green"), BLUE]);
        assert_eq!(pie_colors(&pie, 3).len(), 3);
    }

    #[test]
    fn write_charts_creates_one_file_per_chart() {
        let dir = tempdir().expect("temp dir");
        let out = dir.path().join("charts");
        let mut routes = chart(
            ChartKind::Bar,
            vec![Series::from_pairs("rate", [("a", 1.0)])],
        );
        routes.title = "Top 10 Routes <test>".to_string();
        let written = write_charts(&[routes], &out).expect("write charts");
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("Top 10 Routes _test_.svg"));
        assert!(written[0].exists());
    }
}
