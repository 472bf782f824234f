//! Semantic schema model
//!
//! The recursive, closed-kind type description used both to interpret
//! structured records and to declare the desired output shape of a sink.
//!
//! # Overview
//!
//! This module provides:
//! - The [`Schema`] tree and its [`RecordSchema`]/[`Field`] nodes
//! - A JSON schema-description codec (Avro-style type names)
//! - Structural fingerprinting for cache keys

mod parse;
mod types;

pub use types::{Field, RecordSchema, Schema};
