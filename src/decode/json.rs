//! JSON to structured record decoding

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::{StructuredRecord, Value};
use crate::schema::{RecordSchema, Schema};
use crate::types::JsonValue;

/// Decode one JSON object into a structured record.
///
/// Fields absent from the JSON object stay unset; extra JSON keys the
/// schema does not declare are ignored.
pub fn record_from_json(schema: &Arc<RecordSchema>, json: &JsonValue) -> Result<StructuredRecord> {
    let JsonValue::Object(object) = json else {
        return Err(Error::decode(format!(
            "expected a JSON object for record '{}', got {json}",
            schema.name()
        )));
    };

    let mut builder = StructuredRecord::builder(Arc::clone(schema));
    for field in schema.fields() {
        if let Some(value) = object.get(field.name()) {
            builder = builder.set(
                field.name(),
                value_from_json(field.schema(), value, field.name())?,
            );
        }
    }
    builder.build()
}

/// Decode a JSON value against a schema node
pub fn value_from_json(schema: &Schema, json: &JsonValue, path: &str) -> Result<Value> {
    match schema {
        Schema::Nullable(inner) => {
            if json.is_null() {
                Ok(Value::Null)
            } else {
                value_from_json(inner, json, path)
            }
        }
        Schema::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(path, "boolean", json)),
        Schema::Int32 => json
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int32)
            .ok_or_else(|| mismatch(path, "int", json)),
        Schema::Int64 => json
            .as_i64()
            .map(Value::Int64)
            .ok_or_else(|| mismatch(path, "long", json)),
        Schema::Float32 => json
            .as_f64()
            .map(|f| Value::Float32(f as f32))
            .ok_or_else(|| mismatch(path, "float", json)),
        Schema::Float64 => json
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| mismatch(path, "double", json)),
        Schema::Bytes => {
            let text = json.as_str().ok_or_else(|| mismatch(path, "bytes", json))?;
            let decoded = BASE64.decode(text).map_err(|e| {
                Error::decode(format!("field '{path}': invalid base64 bytes: {e}"))
            })?;
            Ok(Value::from(decoded))
        }
        Schema::String | Schema::Enum(_) => json
            .as_str()
            .map(Value::from)
            .ok_or_else(|| mismatch(path, "string", json)),
        Schema::Array(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| mismatch(path, "array", json))?;
            let mut decoded = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                decoded.push(value_from_json(
                    element,
                    item,
                    &format!("{path}[{index}]"),
                )?);
            }
            Ok(Value::Array(decoded))
        }
        Schema::Map(value_schema) => {
            let entries = json
                .as_object()
                .ok_or_else(|| mismatch(path, "map", json))?;
            let mut decoded = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                decoded.insert(
                    key.clone(),
                    value_from_json(value_schema, entry, &format!("{path}[{key}]"))?,
                );
            }
            Ok(Value::Map(decoded))
        }
        Schema::Record(nested) => {
            let record = record_from_json(&Arc::new(nested.clone()), json)?;
            Ok(Value::Record(record))
        }
    }
}

/// Decode JSONL text, one record per non-blank line
pub fn records_from_jsonl(schema: &Arc<RecordSchema>, text: &str) -> Result<Vec<StructuredRecord>> {
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let json: JsonValue = serde_json::from_str(line)
            .map_err(|e| Error::decode(format!("line {}: invalid JSON: {e}", number + 1)))?;
        records.push(record_from_json(schema, &json)?);
    }
    Ok(records)
}

fn mismatch(path: &str, expected: &str, json: &JsonValue) -> Error {
    Error::decode(format!("field '{path}': expected {expected}, got {json}"))
}
