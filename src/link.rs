//! Record linkage between decoded errands and orders.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::LinkArgs, decode::DecodedErrand, io_utils, pipeline::Dataset, records::Order, schema,
};

/// One errand matched to one order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactFact<'a> {
    pub errand: &'a DecodedErrand,
    pub order: &'a Order,
}

/// The contact-fact table: the inner join of errands and orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedTable<'a> {
    facts: Vec<ContactFact<'a>>,
}

impl<'a> LinkedTable<'a> {
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn facts(&self) -> &[ContactFact<'a>] {
        &self.facts
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactFact<'a>> {
        self.facts.iter()
    }

    /// Distinct order ids that received at least one linked contact.
    pub fn order_ids(&self) -> HashSet<&'a str> {
        self.facts.iter().map(|f| f.order.id.as_str()).collect()
    }
}

/// Inner-joins errands to orders on the decoded key.
///
/// Every (errand, order) pair with equal keys is emitted once, in errand
/// order and then order-table order. Errands without a key never match.
pub fn link<'a>(errands: &'a [DecodedErrand], orders: &'a [Order]) -> LinkedTable<'a> {
    let mut lookup: HashMap<&str, Vec<&Order>> = HashMap::new();
    for order in orders {
        lookup.entry(order.id.as_str()).or_default().push(order);
    }

    let mut facts = Vec::new();
    for errand in errands {
        let Some(key) = errand.order_key.as_deref() else {
            continue;
        };
        if let Some(bucket) = lookup.get(key) {
            facts.extend(bucket.iter().map(|order| ContactFact { errand, order }));
        }
    }
    info!(
        "Linked {} contact(s) from {} errand(s) against {} order(s)",
        facts.len(),
        errands.len(),
        orders.len()
    );
    LinkedTable { facts }
}

pub fn execute(args: &LinkArgs) -> Result<()> {
    let dataset = Dataset::from_args(&args.input)?;
    let linked = dataset.link();

    let errand_headers = &dataset.errands_frame.headers;
    let order_headers = &dataset.orders_frame.headers;
    let order_key_idx = order_headers
        .iter()
        .position(|h| h == schema::ORDER_ID);
    let (output_headers, order_columns) =
        build_output_headers(errand_headers, order_headers, order_key_idx);

    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), b',')?;
    writer
        .write_record(&output_headers)
        .context("Writing linked headers")?;
    for fact in linked.iter() {
        let mut combined = dataset
            .errands_frame
            .rows
            .get(fact.errand.errand.row)
            .cloned()
            .unwrap_or_default();
        combined.resize(errand_headers.len(), String::new());
        combined.push(fact.order.id.clone());
        combined.extend(
            order_columns
                .iter()
                .map(|idx| dataset.orders_frame.cell(fact.order.row, *idx).to_string()),
        );
        writer
            .write_record(&combined)
            .context("Writing linked row")?;
    }
    writer.flush().context("Flushing linked output")?;
    info!("Wrote {} linked row(s)", linked.len());
    Ok(())
}

fn build_output_headers(
    errand_headers: &[String],
    order_headers: &[String],
    order_key_idx: Option<usize>,
) -> (Vec<String>, Vec<usize>) {
    let mut headers = errand_headers.to_vec();
    let mut seen: HashSet<String> = headers.iter().cloned().collect();
    let mut order_columns = Vec::new();

    let mut push_unique = |name: &str, headers: &mut Vec<String>| {
        let mut candidate = name.to_string();
        let mut counter = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("right_{name}_{counter}");
            counter += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    };

    push_unique(schema::ORDER_ID, &mut headers);
    for (idx, name) in order_headers.iter().enumerate() {
        if Some(idx) == order_key_idx {
            continue;
        }
        push_unique(name, &mut headers);
        order_columns.push(idx);
    }
    (headers, order_columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Errand;

    fn order(row: usize, id: &str) -> Order {
        Order {
            row,
            id: id.to_string(),
            ..Order::default()
        }
    }

    fn errand(row: usize, key: Option<&str>) -> DecodedErrand {
        DecodedErrand {
            errand: Errand {
                row,
                ..Errand::default()
            },
            order_key: key.map(str::to_string),
        }
    }

    #[test]
    fn link_preserves_multiplicity_and_drops_unmatched() {
        let orders = vec![order(0, "1"), order(1, "2"), order(2, "3")];
        let errands = vec![
            errand(0, Some("1")),
            errand(1, Some("1")),
            errand(2, Some("2")),
            errand(3, Some("99")),
            errand(4, None),
        ];
        let linked = link(&errands, &orders);
        assert_eq!(linked.len(), 3);
        let pairs = linked
            .iter()
            .map(|f| (f.errand.errand.row, f.order.id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0, "1"), (1, "1"), (2, "2")]);
        assert!(linked.len() <= errands.len());
        let ids = linked.order_ids();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains("3"));
    }

    #[test]
    fn duplicate_order_ids_multiply_matches() {
        let orders = vec![order(0, "5"), order(1, "5")];
        let errands = vec![errand(0, Some("5"))];
        let linked = link(&errands, &orders);
        let rows = linked.iter().map(|f| f.order.row).collect::<Vec<_>>();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn empty_inputs_produce_empty_table() {
        let linked = link(&[], &[]);
        assert!(linked.is_empty());
        assert!(linked.order_ids().is_empty());
    }

    #[test]
    fn output_headers_rename_collisions() {
        let errand_headers = vec!["Order_number".to_string(), "Brand".to_string()];
        let order_headers = vec![
            "Order_id".to_string(),
            "Brand".to_string(),
            "Partner".to_string(),
        ];
        let (headers, columns) = build_output_headers(&errand_headers, &order_headers, Some(0));
        assert_eq!(
            headers,
            vec!["Order_number", "Brand", "Order_id", "right_Brand_1", "Partner"]
        );
        assert_eq!(columns, vec![1, 2]);
    }
}
