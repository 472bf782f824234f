//! Shared field conversion
//!
//! One recursion, used by all three transformers, mapping a
//! (value, schema-node) pair into a generic self-describing value. The
//! Avro value type is the common carrier; the columnar transformer emits
//! it directly, the row transformer lowers it into Arrow arrays, and the
//! text transformer renders its primitive forms.

use apache_avro::types::Value as GenericValue;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::record::{StructuredRecord, Value};
use crate::schema::{RecordSchema, Schema};

/// Convert a single field value against its schema node.
///
/// `path` locates the value within the record for error messages.
pub fn convert(value: &Value, schema: &Schema, path: &str) -> Result<GenericValue> {
    if let Schema::Nullable(inner) = schema {
        return if value.is_null() {
            Ok(GenericValue::Union(0, Box::new(GenericValue::Null)))
        } else {
            let converted = convert(value, inner, path)?;
            Ok(GenericValue::Union(1, Box::new(converted)))
        };
    }

    match (schema, value) {
        (Schema::Bool, Value::Bool(b)) => Ok(GenericValue::Boolean(*b)),
        (Schema::Int32, Value::Int32(i)) => Ok(GenericValue::Int(*i)),
        (Schema::Int64, Value::Int64(i)) => Ok(GenericValue::Long(*i)),
        (Schema::Float32, Value::Float32(f)) => Ok(GenericValue::Float(*f)),
        (Schema::Float64, Value::Float64(f)) => Ok(GenericValue::Double(*f)),
        (Schema::Bytes, Value::Bytes(b)) => Ok(GenericValue::Bytes(b.to_vec())),
        (Schema::String, Value::String(s)) => Ok(GenericValue::String(s.clone())),
        // Symbol-set membership is enforced by the derived target schema,
        // not here.
        (Schema::Enum(_), Value::String(s)) => Ok(GenericValue::String(s.clone())),
        (Schema::Array(element), Value::Array(items)) => {
            let mut converted = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                converted.push(convert(item, element, &format!("{path}[{index}]"))?);
            }
            Ok(GenericValue::Array(converted))
        }
        (Schema::Map(value_schema), Value::Map(entries)) => {
            let mut converted = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                let item = convert(entry, value_schema, &format!("{path}[{key}]"))?;
                converted.insert(key.clone(), item);
            }
            Ok(GenericValue::Map(converted))
        }
        (Schema::Record(nested), Value::Record(record)) => {
            let fields = convert_record(record, nested, path)?;
            Ok(GenericValue::Record(fields))
        }
        (schema, Value::Null) => Err(Error::unsupported_type(
            path,
            format!("null value for non-nullable type '{}'", schema.kind_name()),
        )),
        (schema, value) => Err(Error::unsupported_type(
            path,
            format!(
                "expected '{}', got '{}'",
                schema.kind_name(),
                value.kind_name()
            ),
        )),
    }
}

/// The record-building path shared by the transformers.
///
/// Iterates `output`'s fields in declared order, resolving each against
/// the record's own schema. A declared field missing from that schema
/// fails before any value conversion for the record proceeds; a field
/// present in the schema but unset in the record reads as null.
pub fn convert_record(
    record: &StructuredRecord,
    output: &RecordSchema,
    path: &str,
) -> Result<Vec<(String, GenericValue)>> {
    let own_schema = record.schema();

    let mut resolved = Vec::with_capacity(output.fields().len());
    for field in output.fields() {
        let field_path = if path.is_empty() {
            field.name().to_string()
        } else {
            format!("{path}.{}", field.name())
        };
        let input_field = own_schema
            .field(field.name())
            .ok_or_else(|| Error::missing_field(field_path.clone()))?;
        resolved.push((field_path, input_field));
    }

    let mut fields = Vec::with_capacity(resolved.len());
    for (field_path, input_field) in resolved {
        let value = record.get(input_field.name()).unwrap_or(&Value::Null);
        let converted = convert(value, input_field.schema(), &field_path)?;
        fields.push((input_field.name().to_string(), converted));
    }
    Ok(fields)
}
