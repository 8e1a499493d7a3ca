//! Assembles the fixed chart set from the computed metrics.

use log::warn;
use serde::Serialize;

use crate::{
    config::AnalysisConfig,
    decode::DecodedErrand,
    link::LinkedTable,
    metrics::{self, Dimension, ErrandField, KeyMetrics},
    records::Order,
    series::Series,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    StackedBar,
}

/// A titled chart over one series (bar, pie) or several (stacked bar).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub color: &'static str,
    pub label_rotation: i32,
    pub series: Vec<Series>,
}

impl Chart {
    fn bar(title: impl Into<String>, x_label: &str, y_label: &str, series: Series) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind: ChartKind::Bar,
            color: "blue",
            label_rotation: 45,
            series: vec![series],
        }
    }

    fn pie(title: impl Into<String>, series: Series) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Pie,
            color: "blue",
            label_rotation: 0,
            series: vec![series],
        }
    }

    fn color(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    fn rotation(mut self, degrees: i32) -> Self {
        self.label_rotation = degrees;
        self
    }

    /// The first (and for bar/pie charts only) series.
    pub fn primary(&self) -> Option<&Series> {
        self.series.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub key_metrics: KeyMetrics,
    pub charts: Vec<Chart>,
}

impl Report {
    pub fn chart(&self, title: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.title == title)
    }
}

pub fn build(
    orders: &[Order],
    errands: &[DecodedErrand],
    linked: &LinkedTable<'_>,
    config: &AnalysisConfig,
) -> Report {
    let key_metrics = KeyMetrics::compute(orders, errands, linked);
    let top = config.top;
    let mut charts = Vec::new();

    charts.push(Chart::bar(
        "Distribution of Contacts per Order vs Number of Orders",
        "Number of Contacts per Order",
        "Number of Orders",
        metrics::contacts_per_order_series(linked).head(config.distribution_limit),
    ));
    charts.push(
        Chart::pie(
            "Percentage of Orders With and Without Customer Service Contacts",
            Series::from_pairs(
                "orders",
                [
                    ("No Contact", key_metrics.without_contacts),
                    ("With Contact", key_metrics.with_contacts),
                ],
            ),
        )
        .color("green"),
    );
    charts.push(
        Chart::bar(
            "Distribution of Contacts per Order vs Percentage of Orders",
            "Contact Type",
            "Percentage of Orders",
            Series::from_pairs(
                "orders",
                [
                    ("1 Contact", key_metrics.single_contact),
                    ("2 Contacts", key_metrics.two_contacts),
                    (">1 Contact", key_metrics.multi_contact),
                ],
            ),
        )
        .color("orange")
        .rotation(0),
    );

    charts.push(
        Chart::bar(
            format!("Top {top} Frequency of Errand Categories"),
            "Errand Category",
            "Frequency",
            metrics::errand_frequencies(errands, ErrandField::Category, top),
        )
        .color("orange"),
    );
    charts.push(Chart::pie(
        "Distribution of Communication Channels",
        metrics::errand_frequencies(errands, ErrandField::Channel, 0),
    ));
    charts.push(
        Chart::bar(
            format!("Top {top} Errand types"),
            "Errand Type",
            "Frequency",
            metrics::errand_frequencies(errands, ErrandField::Type, top),
        )
        .color("green"),
    );
    charts.push(Chart::bar(
        format!("Top {top} Errand Actions"),
        "Errand Action",
        "Frequency",
        metrics::errand_frequencies(errands, ErrandField::Action, top),
    ));

    charts.push(
        Chart::bar(
            "Customer Contacts by Brand",
            "Brand",
            "Frequency",
            metrics::contacts_by(linked, Dimension::Brand, 0),
        )
        .color("purple"),
    );
    charts.push(
        Chart::bar(
            format!(
                "Top {} Errand Categories for {}",
                config.focus_brand_top, config.focus_brand
            ),
            "Errand Category",
            "Number of Contacts",
            metrics::brand_categories(linked, &config.focus_brand, config.focus_brand_top),
        )
        .rotation(15),
    );

    charts.push(
        Chart::bar(
            format!("Top {top} Countries with No Customer Contacts"),
            "Country",
            "Number of Contacts",
            metrics::countries_without_contacts(orders, linked, top),
        )
        .color("teal"),
    );
    charts.push(Chart::bar(
        format!("Top {top} Countries with Most Customer Contacts"),
        "Country",
        "Number of Contacts",
        metrics::contacts_by(linked, Dimension::SiteCountry, top),
    ));

    charts.push(
        Chart::bar(
            "Customer Service Contact Rate by Month",
            "Month",
            "Contact Rate (%)",
            metrics::monthly_contact_rate(orders, linked),
        )
        .color("purple"),
    );

    charts.push(Chart::bar(
        "Customer Service Interaction Rates by Partner",
        Dimension::Partner.label(),
        "Interaction Rate (%)",
        metrics::interaction_rate(orders, linked, Dimension::Partner).head(top),
    ));
    match metrics::partner_category_share(linked, &config.focus_partner) {
        Some(share) => charts.push(
            Chart::bar(
                format!("Errand Categories for {}", config.focus_partner),
                "Errand Category",
                "Percentage of Total Contacts",
                share,
            )
            .color("orange"),
        ),
        None => warn!(
            "No linked contacts for partner '{}'; skipping partner category chart",
            config.focus_partner
        ),
    }

    let origin_rates = metrics::interaction_rate(orders, linked, Dimension::OriginCountry).head(top);
    let top_countries = origin_rates.labels().map(str::to_string).collect::<Vec<_>>();
    charts.push(Chart::bar(
        format!("Top {top} Customer Service Interaction Rates by Origin Country"),
        Dimension::OriginCountry.label(),
        "Interaction Rate (%)",
        origin_rates,
    ));
    charts.push(
        Chart::bar(
            format!("Top {top} Customer Service Interaction Rates by Destination Country"),
            Dimension::DestinationCountry.label(),
            "Interaction Rate (%)",
            metrics::interaction_rate(orders, linked, Dimension::DestinationCountry).head(top),
        )
        .color("orange"),
    );
    charts.push(Chart {
        title: format!("Top {top} Errand Categories with Highest Contacts Across Countries"),
        x_label: "Errand Category".to_string(),
        y_label: "Number of Contacts".to_string(),
        kind: ChartKind::StackedBar,
        color: "blue",
        label_rotation: 45,
        series: metrics::category_mix_by_country(linked, &top_countries, top),
    });
    charts.push(
        Chart::bar(
            format!("Top {top} Routes with Highest Customer Service Interaction Rates"),
            Dimension::Route.label(),
            "Interaction Rate (%)",
            metrics::interaction_rate(orders, linked, Dimension::Route).head(top),
        )
        .color("purple")
        .rotation(15),
    );

    charts.push(
        Chart::bar(
            format!("Top {top} Origin Countries with Highest Cancellation Rates"),
            Dimension::OriginCountry.label(),
            "Number of Cancellations",
            metrics::cancellations_by(orders, Dimension::OriginCountry, top),
        )
        .color("red")
        .rotation(15),
    );
    charts.push(
        Chart::bar(
            format!("Top {top} Destination Countries with Highest Cancellation Rates"),
            Dimension::DestinationCountry.label(),
            "Number of Cancellations",
            metrics::cancellations_by(orders, Dimension::DestinationCountry, top),
        )
        .color("red")
        .rotation(15),
    );
    charts.push(
        Chart::bar(
            format!("Top {top} Cancellation Reasons"),
            "Cancellation Reason",
            "Frequency",
            metrics::cancel_reasons(orders, top),
        )
        .color("red"),
    );
    charts.push(
        Chart::bar(
            format!("Top {} Change Reasons", config.change_reason_top),
            "Change Reason",
            "Frequency",
            metrics::change_reasons(orders, config.change_reason_top),
        )
        .rotation(10),
    );

    Report {
        key_metrics,
        charts,
    }
}
