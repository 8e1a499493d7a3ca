//! Typed projections of the normalized orders and errands frames.

use anyhow::Result;
use log::info;

use crate::{
    data::{non_empty, parse_flag},
    frame::Frame,
    schema::{self, ColumnLookup},
};

/// One purchase order. `row` is the position in the source frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub row: usize,
    pub id: String,
    pub created_at: Option<String>,
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    pub site_country: Option<String>,
    pub partner: Option<String>,
    pub brand: Option<String>,
    pub is_canceled: bool,
    pub cancel_reason: Option<String>,
    pub change_reason: Option<String>,
}

impl Order {
    /// `"<origin> -> <destination>"`, absent when either side is unknown.
    pub fn route(&self) -> Option<String> {
        match (&self.origin_country, &self.destination_country) {
            (Some(origin), Some(destination)) => Some(format!("{origin} -> {destination}")),
            _ => None,
        }
    }
}

/// One customer-service contact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errand {
    pub row: usize,
    pub order_number: Option<String>,
    pub category: Option<String>,
    pub channel: Option<String>,
    pub kind: Option<String>,
    pub action: Option<String>,
}

fn optional_cell(frame: &Frame, row: usize, column: Option<usize>) -> Option<String> {
    column.and_then(|idx| non_empty(frame.cell(row, idx)))
}

/// Extracts orders from a frame whose headers are already normalized.
pub fn extract_orders(frame: &Frame) -> Result<Vec<Order>> {
    let lookup = ColumnLookup::new("orders", &frame.headers);
    let id = lookup.required(schema::ORDER_ID)?;
    let created_at = lookup.optional(schema::ORDER_CREATED_AT);
    let origin = lookup.optional(schema::ORIGIN_COUNTRY);
    let destination = lookup.optional(schema::DESTINATION_COUNTRY);
    let site = lookup.optional(schema::SITE_COUNTRY);
    let partner = lookup.optional(schema::PARTNER);
    let brand = lookup.optional(schema::BRAND);
    let canceled = lookup.optional(schema::IS_CANCELED);
    let cancel_reason = lookup.optional(schema::CANCEL_REASON);
    let change_reason = lookup.optional(schema::CHANGE_REASON);

    let orders = (0..frame.len())
        .map(|row| Order {
            row,
            id: frame.cell(row, id).trim().to_string(),
            created_at: optional_cell(frame, row, created_at),
            origin_country: optional_cell(frame, row, origin),
            destination_country: optional_cell(frame, row, destination),
            site_country: optional_cell(frame, row, site),
            partner: optional_cell(frame, row, partner),
            brand: optional_cell(frame, row, brand),
            is_canceled: canceled
                .map(|idx| parse_flag(frame.cell(row, idx)))
                .unwrap_or(false),
            cancel_reason: optional_cell(frame, row, cancel_reason),
            change_reason: optional_cell(frame, row, change_reason),
        })
        .collect::<Vec<_>>();
    info!("Extracted {} order(s)", orders.len());
    Ok(orders)
}

/// Extracts errands from a frame whose headers are already normalized.
pub fn extract_errands(frame: &Frame) -> Result<Vec<Errand>> {
    let lookup = ColumnLookup::new("errands", &frame.headers);
    let order_number = lookup.required(schema::ORDER_NUMBER)?;
    let category = lookup.optional(schema::ERRAND_CATEGORY);
    let channel = lookup.optional(schema::ERRAND_CHANNEL);
    let kind = lookup.optional(schema::ERRAND_TYPE);
    let action = lookup.optional(schema::ERRAND_ACTION);

    let errands = (0..frame.len())
        .map(|row| Errand {
            row,
            order_number: optional_cell(frame, row, Some(order_number)),
            category: optional_cell(frame, row, category),
            channel: optional_cell(frame, row, channel),
            kind: optional_cell(frame, row, kind),
            action: optional_cell(frame, row, action),
        })
        .collect::<Vec<_>>();
    info!("Extracted {} errand(s)", errands.len());
    Ok(errands)
}
