//! Rate, ratio and count metrics over orders, errands and linked contacts.
//!
//! Every function here is a pure function of its inputs. Percentages over an
//! empty base evaluate to zero, and rows with unusable values (no decoded
//! key, no parseable timestamp, missing dimension value) are filtered out of
//! the metric that needs them and nowhere else.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::Write as _,
};

use chrono::Datelike;
use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{
    data::{parse_timestamp, percentage},
    decode::DecodedErrand,
    frequency,
    link::{ContactFact, LinkedTable},
    records::Order,
    series::Series,
};

/// The headline percentages written to the key metrics file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub orders: usize,
    pub errands: usize,
    pub linked: usize,
    pub single_contact_orders: usize,
    pub two_contact_orders: usize,
    pub with_contacts: f64,
    pub without_contacts: f64,
    pub single_contact: f64,
    pub two_contacts: f64,
    pub multi_contact: f64,
}

impl KeyMetrics {
    pub fn compute(orders: &[Order], errands: &[DecodedErrand], linked: &LinkedTable<'_>) -> Self {
        let key_counts = errand_key_counts(errands);
        let single = keys_with_count(&key_counts, 1);
        let two = keys_with_count(&key_counts, 2);
        let linked_count = linked.len();
        Self {
            orders: orders.len(),
            errands: errands.len(),
            linked: linked_count,
            single_contact_orders: single,
            two_contact_orders: two,
            with_contacts: contact_coverage(orders.len(), linked_count),
            without_contacts: no_contact_percentage(orders.len(), linked_count),
            single_contact: percentage(single as f64, linked_count as f64),
            two_contacts: percentage(two as f64, linked_count as f64),
            multi_contact: multi_contact_ratio(linked_count, single),
        }
    }

    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Percentage of Orders With Contacts", self.with_contacts),
            ("Percentage of Orders Without Contacts", self.without_contacts),
            ("Percentage of Orders With 1 Contact", self.single_contact),
            ("Percentage of Orders With 2 Contacts", self.two_contacts),
            ("Percentage of Orders With >1 Contact", self.multi_contact),
        ]
    }

    /// Renders the five `label: value%` lines of the key metrics file.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for (label, value) in self.entries() {
            let _ = writeln!(output, "{label}: {value:.2}%");
        }
        output
    }
}

/// Linked rows per order, as a percentage. Multiple contacts on one order
/// count multiple times, so this can exceed 100.
pub fn contact_coverage(orders: usize, linked: usize) -> f64 {
    percentage(linked as f64, orders as f64)
}

/// `(orders - linked) / orders * 100`; negative when linked rows outnumber
/// orders.
pub fn no_contact_percentage(orders: usize, linked: usize) -> f64 {
    percentage(orders as f64 - linked as f64, orders as f64)
}

pub fn multi_contact_ratio(linked: usize, single_contact_orders: usize) -> f64 {
    percentage(
        linked as f64 - single_contact_orders as f64,
        linked as f64,
    )
}

/// Errands per decoded key, before linkage. Errands without a key are skipped.
pub fn errand_key_counts(errands: &[DecodedErrand]) -> HashMap<&str, usize> {
    errands
        .iter()
        .filter_map(|e| e.order_key.as_deref())
        .counts()
}

pub fn keys_with_count(counts: &HashMap<&str, usize>, expected: usize) -> usize {
    counts.values().filter(|count| **count == expected).count()
}

/// Number of orders per contacts-per-order value, ascending by contact count.
pub fn contacts_per_order_distribution(linked: &LinkedTable<'_>) -> Vec<(usize, usize)> {
    let per_order = linked.iter().map(|f| f.order.id.as_str()).counts();
    let mut distribution = BTreeMap::new();
    for count in per_order.into_values() {
        *distribution.entry(count).or_insert(0usize) += 1;
    }
    distribution.into_iter().collect()
}

pub fn contacts_per_order_series(linked: &LinkedTable<'_>) -> Series {
    Series::from_pairs(
        "orders",
        contacts_per_order_distribution(linked)
            .into_iter()
            .map(|(contacts, orders)| (contacts.to_string(), orders as f64)),
    )
}

/// Order attributes that interaction rates and cancellations can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    OriginCountry,
    DestinationCountry,
    SiteCountry,
    Partner,
    Brand,
    Route,
}

impl Dimension {
    pub fn value(self, order: &Order) -> Option<String> {
        match self {
            Dimension::OriginCountry => order.origin_country.clone(),
            Dimension::DestinationCountry => order.destination_country.clone(),
            Dimension::SiteCountry => order.site_country.clone(),
            Dimension::Partner => order.partner.clone(),
            Dimension::Brand => order.brand.clone(),
            Dimension::Route => order.route(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::OriginCountry => "Origin Country",
            Dimension::DestinationCountry => "Destination Country",
            Dimension::SiteCountry => "Country",
            Dimension::Partner => "Partner",
            Dimension::Brand => "Brand",
            Dimension::Route => "Route (Origin -> Destination)",
        }
    }
}

fn distinct_orders_by<'a, I>(orders: I, dimension: Dimension) -> HashMap<String, HashSet<&'a str>>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut groups: HashMap<String, HashSet<&str>> = HashMap::new();
    for order in orders {
        if let Some(value) = dimension.value(order) {
            groups.entry(value).or_default().insert(order.id.as_str());
        }
    }
    groups
}

/// Distinct contacted orders over distinct orders for every value of
/// `dimension`, as a percentage, highest rate first.
pub fn interaction_rate(
    orders: &[Order],
    linked: &LinkedTable<'_>,
    dimension: Dimension,
) -> Series {
    let totals = distinct_orders_by(orders, dimension);
    let contacted = distinct_orders_by(linked.iter().map(|f| f.order), dimension);
    let values = totals
        .keys()
        .chain(contacted.keys())
        .collect::<BTreeSet<_>>();
    Series::from_pairs(
        "interaction rate",
        values.into_iter().map(|value| {
            let total = totals.get(value).map_or(0, HashSet::len);
            let reached = contacted.get(value).map_or(0, HashSet::len);
            (value.clone(), percentage(reached as f64, total as f64))
        }),
    )
    .sorted_descending()
}

fn order_month(order: &Order) -> Option<u32> {
    let raw = order.created_at.as_deref()?;
    match parse_timestamp(raw) {
        Ok(ts) => Some(ts.month()),
        Err(err) => {
            debug!("Dropping order '{}' from monthly rates: {err}", order.id);
            None
        }
    }
}

/// Linked rows per month over orders per month, as a percentage. Orders
/// whose creation timestamp is missing or unparseable drop out of both sides.
pub fn monthly_contact_rate(orders: &[Order], linked: &LinkedTable<'_>) -> Series {
    let order_months = orders.iter().filter_map(order_month).counts();
    let contact_months = linked.iter().filter_map(|f| order_month(f.order)).counts();
    let months = order_months
        .keys()
        .chain(contact_months.keys())
        .copied()
        .collect::<BTreeSet<_>>();
    Series::from_pairs(
        "contact rate",
        months.into_iter().map(|month| {
            let total = order_months.get(&month).copied().unwrap_or(0);
            let contacts = contact_months.get(&month).copied().unwrap_or(0);
            (month.to_string(), percentage(contacts as f64, total as f64))
        }),
    )
}

/// Canceled orders per value of `dimension`, most frequent first.
pub fn cancellations_by(orders: &[Order], dimension: Dimension, top: usize) -> Series {
    let values = orders
        .iter()
        .filter(|o| o.is_canceled)
        .map(|o| dimension.value(o))
        .collect::<Vec<_>>();
    frequency::top_values("cancellations", values.iter().map(Option::as_deref), top)
}

pub fn cancel_reasons(orders: &[Order], top: usize) -> Series {
    frequency::top_values(
        "cancellations",
        orders.iter().map(|o| o.cancel_reason.as_deref()),
        top,
    )
}

pub fn change_reasons(orders: &[Order], top: usize) -> Series {
    frequency::top_values(
        "changes",
        orders.iter().map(|o| o.change_reason.as_deref()),
        top,
    )
}

/// Errand attributes available for frequency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrandField {
    Category,
    Channel,
    Type,
    Action,
}

impl ErrandField {
    pub fn value(self, errand: &DecodedErrand) -> Option<&str> {
        let errand = &errand.errand;
        match self {
            ErrandField::Category => errand.category.as_deref(),
            ErrandField::Channel => errand.channel.as_deref(),
            ErrandField::Type => errand.kind.as_deref(),
            ErrandField::Action => errand.action.as_deref(),
        }
    }
}

/// Frequency of an errand attribute across every errand, linked or not.
pub fn errand_frequencies(errands: &[DecodedErrand], field: ErrandField, top: usize) -> Series {
    frequency::top_values("frequency", errands.iter().map(|e| field.value(e)), top)
}

/// Linked contacts per value of an order attribute.
pub fn contacts_by(linked: &LinkedTable<'_>, dimension: Dimension, top: usize) -> Series {
    let values = linked
        .iter()
        .map(|f| dimension.value(f.order))
        .collect::<Vec<_>>();
    frequency::top_values("contacts", values.iter().map(Option::as_deref), top)
}

fn linked_where<'l, 'a>(
    linked: &'l LinkedTable<'a>,
    dimension: Dimension,
    expected: &'l str,
) -> impl Iterator<Item = &'l ContactFact<'a>> {
    linked
        .iter()
        .filter(move |f| dimension.value(f.order).as_deref() == Some(expected))
}

/// Category frequencies among contacts on orders of one brand.
pub fn brand_categories(linked: &LinkedTable<'_>, brand: &str, top: usize) -> Series {
    frequency::top_values(
        "contacts",
        linked_where(linked, Dimension::Brand, brand).map(|f| ErrandField::Category.value(f.errand)),
        top,
    )
}

/// Share of each category among one partner's contacts, or `None` when the
/// partner has no linked contacts.
pub fn partner_category_share(linked: &LinkedTable<'_>, partner: &str) -> Option<Series> {
    let facts = linked_where(linked, Dimension::Partner, partner).collect::<Vec<_>>();
    if facts.is_empty() {
        return None;
    }
    Some(frequency::value_shares(
        "share",
        facts.iter().map(|f| ErrandField::Category.value(f.errand)),
    ))
}

/// Site-country frequency among orders that never received a linked contact.
pub fn countries_without_contacts(orders: &[Order], linked: &LinkedTable<'_>, top: usize) -> Series {
    let contacted = linked.order_ids();
    frequency::top_values(
        "orders",
        orders
            .iter()
            .filter(|o| !contacted.contains(o.id.as_str()))
            .map(|o| o.site_country.as_deref()),
        top,
    )
}

/// Contacts per (origin country, category) for the given countries, limited
/// to the `top` categories with the most contacts. One series per country.
///
/// A contact qualifies when either its origin or destination is one of
/// `countries`; it is then attributed to its origin country.
pub fn category_mix_by_country(
    linked: &LinkedTable<'_>,
    countries: &[String],
    top: usize,
) -> Vec<Series> {
    let wanted = countries.iter().map(String::as_str).collect::<HashSet<_>>();
    let in_scope = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|country| wanted.contains(country))
    };
    let cells = linked
        .iter()
        .filter(|f| in_scope(&f.order.origin_country) || in_scope(&f.order.destination_country))
        .filter_map(|f| {
            let origin = f.order.origin_country.as_deref()?;
            let category = ErrandField::Category.value(f.errand)?;
            Some((origin, category))
        })
        .counts();

    let mut category_totals: HashMap<&str, usize> = HashMap::new();
    for (&(_, category), &count) in &cells {
        *category_totals.entry(category).or_insert(0) += count;
    }
    let categories = category_totals
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(category, _)| category)
        .take(if top == 0 { usize::MAX } else { top })
        .collect::<Vec<_>>();

    let origins = cells
        .keys()
        .map(|(origin, _)| *origin)
        .collect::<BTreeSet<_>>();
    origins
        .into_iter()
        .map(|origin| {
            Series::from_pairs(
                origin,
                categories.iter().map(|category| {
                    let count = cells.get(&(origin, *category)).copied().unwrap_or(0);
                    (category.to_string(), count as f64)
                }),
            )
        })
        .collect()
}
