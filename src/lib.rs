//! # lakesink
//!
//! A minimal, Rust-native toolkit for building batch data sink connectors.
//!
//! ## Features
//!
//! - **Schema-directed transcoding**: convert self-describing structured
//!   records into columnar (Avro), row (Arrow), or delimited text output
//! - **Projection validation**: output schemas are checked against the
//!   input schema at configuration time, before any record flows
//! - **Derived-schema caching**: target-format schemas are derived once
//!   per distinct structural schema, not once per record
//! - **File writers**: Parquet, Avro object container, and plain text
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lakesink::config::SinkConfig;
//! use lakesink::sink::RecordSink;
//!
//! fn main() -> lakesink::Result<()> {
//!     let config = SinkConfig::from_yaml(std::fs::read_to_string("sink.yaml")?.as_str())?;
//!     let mut sink = RecordSink::configure(&config, Some(&input_schema))?;
//!
//!     for record in records {
//!         let pair = sink.transform(&record)?;
//!         // hand the pair to a writer
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        RecordSink                               │
//! │  configure(config, input schema) → validated transformer        │
//! │  transform(record) → (key, value) output pair                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Schema  │  Record   │   Transcode   │  Decode   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Tree     │ Value     │ Columnar      │ JSON      │ Parquet     │
//! │ JSON     │ Builder   │ Row           │ JSONL     │ Avro        │
//! │ Codec    │           │ Text          │           │ Text        │
//! │          │           │ Validate      │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: doc the error enum variants before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the toolkit
pub mod error;

/// Common types and type aliases
pub mod types;

/// Semantic schema model
pub mod schema;

/// Structured records and field values
pub mod record;

/// JSON record decoding
pub mod decode;

/// Schema-directed transcoding
pub mod transcode;

/// Sink configuration
pub mod config;

/// Sink harness seam
pub mod sink;

/// Output file writers
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::SinkConfig;
pub use record::{StructuredRecord, Value};
pub use schema::{Field, RecordSchema, Schema};
pub use sink::{KeyValue, RecordSink, SinkValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
