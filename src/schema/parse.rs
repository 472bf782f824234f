//! JSON schema-description codec
//!
//! Schemas arrive from configuration as JSON using Avro-style type names.
//! Anything the model cannot represent (general unions, non-string map
//! keys, duplicate fields) is rejected as a malformed schema.

use crate::error::{Error, Result};
use crate::schema::{Field, RecordSchema, Schema};
use crate::types::JsonValue;
use serde_json::json;

impl Schema {
    /// Parse a schema description from a JSON string
    pub fn parse_json(text: &str) -> Result<Schema> {
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| Error::malformed_schema(format!("invalid JSON: {e}")))?;
        Schema::from_json(&value)
    }

    /// Parse a schema description from a JSON value
    pub fn from_json(value: &JsonValue) -> Result<Schema> {
        match value {
            JsonValue::String(name) => primitive_from_name(name),
            JsonValue::Array(branches) => union_from_json(branches),
            JsonValue::Object(obj) => {
                let type_name = obj
                    .get("type")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::malformed_schema("missing 'type' in schema object"))?;
                match type_name {
                    "enum" => enum_from_json(obj),
                    "array" => {
                        let items = obj.get("items").ok_or_else(|| {
                            Error::malformed_schema("array schema missing 'items'")
                        })?;
                        Ok(Schema::array_of(Schema::from_json(items)?))
                    }
                    "map" => {
                        if let Some(keys) = obj.get("keys") {
                            let key_schema = Schema::from_json(keys)?;
                            if key_schema != Schema::String {
                                return Err(Error::malformed_schema(
                                    "map keys must be of type string",
                                ));
                            }
                        }
                        let values = obj.get("values").ok_or_else(|| {
                            Error::malformed_schema("map schema missing 'values'")
                        })?;
                        Ok(Schema::map_of(Schema::from_json(values)?))
                    }
                    "record" => Ok(Schema::Record(record_from_json(obj)?)),
                    // An object wrapping a primitive name is permitted,
                    // e.g. {"type": "string"}.
                    other => primitive_from_name(other),
                }
            }
            other => Err(Error::malformed_schema(format!(
                "unexpected schema element: {other}"
            ))),
        }
    }

    /// Render the schema description back to JSON
    pub fn to_json(&self) -> JsonValue {
        match self {
            Schema::Bool => json!("boolean"),
            Schema::Int32 => json!("int"),
            Schema::Int64 => json!("long"),
            Schema::Float32 => json!("float"),
            Schema::Float64 => json!("double"),
            Schema::Bytes => json!("bytes"),
            Schema::String => json!("string"),
            Schema::Enum(symbols) => json!({ "type": "enum", "symbols": symbols }),
            Schema::Array(element) => json!({ "type": "array", "items": element.to_json() }),
            Schema::Map(value) => json!({ "type": "map", "values": value.to_json() }),
            Schema::Record(record) => record.to_json(),
            Schema::Nullable(inner) => json!(["null", inner.to_json()]),
        }
    }
}

impl RecordSchema {
    /// Parse a record schema description from a JSON string.
    ///
    /// The top-level element of a configured output schema must be a
    /// record; anything else is malformed.
    pub fn parse_json(text: &str) -> Result<RecordSchema> {
        match Schema::parse_json(text)? {
            Schema::Record(record) => Ok(record),
            other => Err(Error::malformed_schema(format!(
                "expected a record schema at the top level, got '{}'",
                other.kind_name()
            ))),
        }
    }

    /// Render the record schema description back to JSON
    pub fn to_json(&self) -> JsonValue {
        let fields: Vec<JsonValue> = self
            .fields()
            .iter()
            .map(|f| json!({ "name": f.name(), "type": f.schema().to_json() }))
            .collect();
        json!({ "type": "record", "name": self.name(), "fields": fields })
    }
}

fn primitive_from_name(name: &str) -> Result<Schema> {
    match name {
        "boolean" => Ok(Schema::Bool),
        "int" => Ok(Schema::Int32),
        "long" => Ok(Schema::Int64),
        "float" => Ok(Schema::Float32),
        "double" => Ok(Schema::Float64),
        "bytes" => Ok(Schema::Bytes),
        "string" => Ok(Schema::String),
        other => Err(Error::malformed_schema(format!("unknown type '{other}'"))),
    }
}

/// Unions are permitted in one shape only: null plus exactly one other kind.
fn union_from_json(branches: &[JsonValue]) -> Result<Schema> {
    let is_null = |v: &JsonValue| v.as_str() == Some("null");
    match branches {
        [a, b] if is_null(a) && !is_null(b) => Ok(Schema::nullable_of(Schema::from_json(b)?)),
        [a, b] if is_null(b) && !is_null(a) => Ok(Schema::nullable_of(Schema::from_json(a)?)),
        _ => Err(Error::malformed_schema(
            "unions are only supported as a nullable type: [\"null\", T]",
        )),
    }
}

fn enum_from_json(obj: &crate::types::JsonObject) -> Result<Schema> {
    let symbols = obj
        .get("symbols")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::malformed_schema("enum schema missing 'symbols'"))?;
    let symbols: Result<Vec<String>> = symbols
        .iter()
        .map(|s| {
            s.as_str()
                .map(ToString::to_string)
                .ok_or_else(|| Error::malformed_schema("enum symbols must be strings"))
        })
        .collect();
    Ok(Schema::Enum(symbols?))
}

fn record_from_json(obj: &crate::types::JsonObject) -> Result<RecordSchema> {
    let name = obj
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::malformed_schema("record schema missing 'name'"))?;
    let fields = obj
        .get("fields")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::malformed_schema("record schema missing 'fields'"))?;

    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let field_obj = field
            .as_object()
            .ok_or_else(|| Error::malformed_schema("record field must be an object"))?;
        let field_name = field_obj
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::malformed_schema("record field missing 'name'"))?;
        let field_type = field_obj
            .get("type")
            .ok_or_else(|| Error::malformed_schema(format!("field '{field_name}' missing 'type'")))?;
        parsed.push(Field::of(field_name, Schema::from_json(field_type)?));
    }

    RecordSchema::new(name, parsed)
}
