//! Loading and preparing both inputs for linkage.
//!
//! Each stage takes the previous stage's output by reference and returns a
//! fresh value: raw frames are normalized into new frames, normalized frames
//! are projected into typed records, and errands are decoded into a new
//! vector. Nothing built by one stage is mutated by a later one.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;

use crate::{
    cli::InputArgs,
    decode::{self, DecodedErrand},
    frame::{self, Frame},
    io_utils,
    link::{self, LinkedTable},
    records::{self, Order},
};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub orders_frame: Frame,
    pub errands_frame: Frame,
    pub orders: Vec<Order>,
    pub errands: Vec<DecodedErrand>,
}

impl Dataset {
    pub fn load(
        orders: &Path,
        errands: &Path,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let orders_frame = frame::load(orders, delimiter, encoding)
            .with_context(|| format!("Loading orders from {orders:?}"))?;
        let errands_frame = frame::load(errands, delimiter, encoding)
            .with_context(|| format!("Loading errands from {errands:?}"))?;
        Self::from_frames(&orders_frame, &errands_frame)
    }

    pub fn from_args(args: &InputArgs) -> Result<Self> {
        let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
        Self::load(&args.orders, &args.errands, args.delimiter, encoding)
    }

    pub fn from_frames(orders: &Frame, errands: &Frame) -> Result<Self> {
        let orders_frame = orders.with_normalized_headers();
        let errands_frame = errands.with_normalized_headers();
        let orders = records::extract_orders(&orders_frame).context("Reading orders")?;
        let raw_errands = records::extract_errands(&errands_frame).context("Reading errands")?;
        let errands = decode::decode_errands(&raw_errands);
        Ok(Self {
            orders_frame,
            errands_frame,
            orders,
            errands,
        })
    }

    pub fn link(&self) -> LinkedTable<'_> {
        link::link(&self.errands, &self.orders)
    }
}
