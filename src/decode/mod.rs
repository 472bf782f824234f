//! Record decoders
//!
//! Builds [`StructuredRecord`](crate::record::StructuredRecord)s from JSON
//! documents against a declared schema, so a sink job can be driven from
//! JSON/JSONL input. Byte fields are carried as base64 strings on the JSON
//! side.

mod json;

pub use json::{record_from_json, records_from_jsonl, value_from_json};
