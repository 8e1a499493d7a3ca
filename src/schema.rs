//! Column naming conventions shared by the orders and errands tables.
//!
//! Both source systems export column names in whatever casing they like. The
//! pipeline normalizes every header by upper-casing its first character and
//! passing the rest through verbatim, then resolves columns by the canonical
//! names declared here.

use thiserror::Error;

pub const ORDER_ID: &str = "Order_id";
pub const ORDER_CREATED_AT: &str = "Order_created_at";
pub const ORIGIN_COUNTRY: &str = "Origin_country";
pub const DESTINATION_COUNTRY: &str = "Destination_country";
pub const SITE_COUNTRY: &str = "Site_country";
pub const PARTNER: &str = "Partner";
pub const BRAND: &str = "Brand";
pub const IS_CANCELED: &str = "Is_canceled";
pub const CANCEL_REASON: &str = "Cancel_reason";
pub const CHANGE_REASON: &str = "Change_reason";

pub const ORDER_NUMBER: &str = "Order_number";
pub const ERRAND_CATEGORY: &str = "Errand_category";
pub const ERRAND_CHANNEL: &str = "Errand_channel";
pub const ERRAND_TYPE: &str = "Errand_type";
pub const ERRAND_ACTION: &str = "Errand_action";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Required column '{column}' not found in {table} (available: {available})")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        available: String,
    },
}

/// Upper-cases the first character of `name`, leaving the remainder untouched.
pub fn normalize_column_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_column_name(h)).collect()
}

/// Positions of named columns within a normalized header row.
#[derive(Debug, Clone)]
pub struct ColumnLookup<'a> {
    table: &'static str,
    headers: &'a [String],
}

impl<'a> ColumnLookup<'a> {
    pub fn new(table: &'static str, headers: &'a [String]) -> Self {
        Self { table, headers }
    }

    pub fn optional(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn required(&self, column: &'static str) -> Result<usize, SchemaError> {
        self.optional(column)
            .ok_or_else(|| SchemaError::MissingColumn {
                table: self.table,
                column,
                available: self.headers.join(", "),
            })
    }
}
