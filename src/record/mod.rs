//! Structured records
//!
//! A structured record is a self-describing row value: a mapping from
//! field names to dynamically typed [`Value`]s paired with the
//! [`RecordSchema`](crate::schema::RecordSchema) that gives the row its
//! shape.

mod types;

pub use types::{RecordBuilder, StructuredRecord, Value};

#[cfg(test)]
mod tests;
