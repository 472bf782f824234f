//! Schema-directed transcoding
//!
//! Converts one [`StructuredRecord`](crate::record::StructuredRecord) into
//! one target-format value: a self-describing Avro generic record
//! (columnar), a typed one-row Arrow batch (row), or a delimited text line
//! (text).
//!
//! # Overview
//!
//! - [`validate`] checks an output schema against an input schema once, at
//!   configuration time, before any record flows
//! - [`SchemaCache`] memoizes derived target-format schemas by structural
//!   fingerprint
//! - [`convert`] is the shared recursive field converter all three
//!   transformers use
//! - [`ColumnarTransformer`], [`RowTransformer`], and [`TextTransformer`]
//!   each build one output value per input record
//!
//! Transformers carry no per-record state beyond the schema cache, so
//! records can be processed independently and out of order.

mod cache;
mod columnar;
mod convert;
mod row;
mod text;
pub mod validate;

pub use cache::SchemaCache;
pub use columnar::{ColumnarRecord, ColumnarTransformer};
pub use convert::{convert, convert_record};
pub use row::RowTransformer;
pub use text::{TextTransformer, DEFAULT_DELIMITER};
pub use validate::{check, validate, Violation};

use crate::error::Result;
use crate::record::StructuredRecord;

/// One transformer variant: builds one output value from one input record.
///
/// Implementations are created once per execution task and invoked
/// synchronously, once per record, by an external iteration driver.
pub trait Transform {
    /// The target-format value this transformer produces
    type Output;

    /// Transcode a single record
    fn transform(&mut self, record: &StructuredRecord) -> Result<Self::Output>;
}

#[cfg(test)]
mod tests;
