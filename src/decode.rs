//! Base-36 order reference decoding.
//!
//! The customer-service system stores the order number as a base-36 string
//! while the order system uses the base-10 identifier. Decoding renders the
//! errand reference into the same textual form as `Order_id` so the two
//! tables can be joined by exact string equality.

use log::debug;
use thiserror::Error;

use crate::records::Errand;

const RADIX: u32 = 36;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty order reference")]
    Empty,
    #[error("invalid base-36 digit '{digit}' in '{input}'")]
    InvalidDigit { input: String, digit: char },
    #[error("order reference '{0}' exceeds 128 bits")]
    Overflow(String),
}

/// Decodes a base-36 string (case-insensitive, surrounding whitespace ignored).
pub fn decode_base36(value: &str) -> Result<u128, DecodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut acc: u128 = 0;
    for ch in trimmed.chars() {
        let digit = ch.to_digit(RADIX).ok_or_else(|| DecodeError::InvalidDigit {
            input: trimmed.to_string(),
            digit: ch,
        })?;
        acc = acc
            .checked_mul(u128::from(RADIX))
            .and_then(|v| v.checked_add(u128::from(digit)))
            .ok_or_else(|| DecodeError::Overflow(trimmed.to_string()))?;
    }
    Ok(acc)
}

/// Encodes a non-negative integer as lowercase base-36.
pub fn encode_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let digit = (value % u128::from(RADIX)) as u32;
        digits.push(char::from_digit(digit, RADIX).unwrap_or('0'));
        value /= u128::from(RADIX);
    }
    digits.iter().rev().collect()
}

/// Derives the join key for an encoded order reference. Malformed input
/// yields `None`; it is never an error.
pub fn order_key(encoded: &str) -> Option<String> {
    match decode_base36(encoded) {
        Ok(value) => Some(value.to_string().trim().to_string()),
        Err(err) => {
            debug!("Order reference not decodable: {err}");
            None
        }
    }
}

/// An errand together with its decoded join key.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedErrand {
    pub errand: Errand,
    pub order_key: Option<String>,
}

pub fn decode_errands(errands: &[Errand]) -> Vec<DecodedErrand> {
    let decoded = errands
        .iter()
        .map(|errand| DecodedErrand {
            order_key: errand.order_number.as_deref().and_then(order_key),
            errand: errand.clone(),
        })
        .collect::<Vec<_>>();
    let undecodable = decoded.iter().filter(|e| e.order_key.is_none()).count();
    if undecodable > 0 {
        debug!(
            "{} of {} errand(s) carry no decodable order reference",
            undecodable,
            decoded.len()
        );
    }
    decoded
}
