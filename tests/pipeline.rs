mod common;

use encoding_rs::UTF_8;
use errand_insights::{
    config::AnalysisConfig,
    frame::Frame,
    metrics::{self, Dimension, KeyMetrics},
    pipeline::Dataset,
    report,
};

use common::{FIXTURE_KEY_METRICS, fixture_path};

fn fixture_dataset() -> Dataset {
    Dataset::load(
        &fixture_path("orders.csv"),
        &fixture_path("errands.csv"),
        None,
        UTF_8,
    )
    .expect("load fixtures")
}

fn frame(headers: &[&str], rows: &[&[&str]]) -> Frame {
    Frame::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

#[test]
fn fixture_metrics_match_expected_file() {
    let dataset = fixture_dataset();
    let linked = dataset.link();
    assert_eq!(dataset.orders.len(), 5);
    assert_eq!(dataset.errands.len(), 7);
    assert_eq!(linked.len(), 4);

    let keys = dataset
        .errands
        .iter()
        .map(|e| e.order_key.as_deref())
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            Some("10"),
            Some("10"),
            Some("11"),
            Some("36"),
            Some("1295"),
            None,
            None
        ]
    );

    let metrics = KeyMetrics::compute(&dataset.orders, &dataset.errands, &linked);
    assert_eq!(metrics.render(), FIXTURE_KEY_METRICS);
}

#[test]
fn single_decoded_match_is_full_coverage() {
    let orders = frame(&["Order_id"], &[&["1"]]);
    let errands = frame(&["Order_number"], &[&["1"]]);
    let dataset = Dataset::from_frames(&orders, &errands).expect("dataset");
    let linked = dataset.link();
    let metrics = KeyMetrics::compute(&dataset.orders, &dataset.errands, &linked);
    assert_eq!(linked.len(), 1);
    assert_eq!(metrics.with_contacts, 100.0);
    assert_eq!(metrics.without_contacts, 0.0);
    assert_eq!(metrics.single_contact, 100.0);
}

#[test]
fn repeated_keys_raise_multi_contact_ratio() {
    // Orders A, B, C (ids 10, 11, 12); errands reference A, A, B.
    let orders = frame(&["Order_id"], &[&["10"], &["11"], &["12"]]);
    let errands = frame(&["Order_number"], &[&["a"], &["a"], &["b"]]);
    let dataset = Dataset::from_frames(&orders, &errands).expect("dataset");
    let linked = dataset.link();
    let metrics = KeyMetrics::compute(&dataset.orders, &dataset.errands, &linked);
    assert_eq!(linked.len(), 3);
    assert_eq!(metrics.render().lines().nth(4), Some("Percentage of Orders With >1 Contact: 66.67%"));
    assert_eq!(
        metrics::contacts_per_order_distribution(&linked),
        vec![(1, 1), (2, 1)]
    );
}

#[test]
fn no_errands_means_no_contacts() {
    let orders = frame(&["Order_id"], &[&["1"], &["2"]]);
    let errands = frame(&["Order_number"], &[]);
    let dataset = Dataset::from_frames(&orders, &errands).expect("dataset");
    let linked = dataset.link();
    let metrics = KeyMetrics::compute(&dataset.orders, &dataset.errands, &linked);
    assert_eq!(metrics.with_contacts, 0.0);
    assert_eq!(metrics.without_contacts, 100.0);
    assert_eq!(metrics.single_contact, 0.0);
    assert_eq!(metrics.multi_contact, 0.0);
}

#[test]
fn interaction_rates_and_monthly_rates_follow_linked_orders() {
    let dataset = fixture_dataset();
    let linked = dataset.link();

    let partners = metrics::interaction_rate(&dataset.orders, &linked, Dimension::Partner);
    assert_eq!(
        partners.labels().collect::<Vec<_>>(),
        vec!["Partner X", "Partner CO", "Partner Y"]
    );
    assert_eq!(partners.get("Partner X"), Some(100.0));
    assert_eq!(partners.get("Partner CO"), Some(50.0));
    assert_eq!(partners.get("Partner Y"), Some(0.0));

    let monthly = metrics::monthly_contact_rate(&dataset.orders, &linked);
    assert_eq!(monthly.labels().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    assert_eq!(monthly.get("1"), Some(150.0));
    assert_eq!(monthly.get("2"), Some(50.0));
    assert_eq!(monthly.get("3"), Some(0.0));
}

#[test]
fn report_covers_cancellations_and_focus_partner() {
    let dataset = fixture_dataset();
    let linked = dataset.link();
    let report = report::build(
        &dataset.orders,
        &dataset.errands,
        &linked,
        &AnalysisConfig::default(),
    );
    let partner = report
        .chart("Errand Categories for Partner CO")
        .and_then(|c| c.primary())
        .expect("partner chart");
    assert_eq!(partner.get("Refund"), Some(50.0));
    assert_eq!(partner.get("Schedule change"), Some(50.0));

    let cancellations = metrics::cancel_reasons(&dataset.orders, 10);
    assert_eq!(cancellations.total(), 2.0);
    assert_eq!(cancellations.get("Duplicate booking"), Some(1.0));
}
