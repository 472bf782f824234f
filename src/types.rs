//! Common types used throughout lakesink
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Output Format
// ============================================================================

/// Target representation produced by a sink, fixed for the lifetime of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Self-describing Avro generic records (schema travels with the value)
    #[default]
    Columnar,
    /// Typed one-row Arrow batches bound to a separately derived schema
    Row,
    /// Delimited text lines of primitive fields
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Columnar => write!(f, "columnar"),
            OutputFormat::Row => write!(f, "row"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "columnar" => Ok(OutputFormat::Columnar),
            "row" => Ok(OutputFormat::Row),
            "text" => Ok(OutputFormat::Text),
            other => Err(crate::error::Error::InvalidConfigValue {
                field: "output_format".to_string(),
                message: format!("unknown output format '{other}'"),
            }),
        }
    }
}
