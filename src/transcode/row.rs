//! Row transformer
//!
//! Produces one typed, one-row Arrow batch per input record. Unlike the
//! columnar output the schema does not travel inside the value; the batch
//! is bound to an Arrow schema derived separately (and cached) from the
//! effective output schema. Nested composites are preserved structurally
//! as List, Map, and Struct columns.

use apache_avro::types::Value as GenericValue;
use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    ListArray, MapArray, StringArray, StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields, Schema as ArrowSchema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::StructuredRecord;
use crate::schema::{RecordSchema, Schema};
use crate::transcode::cache::SchemaCache;
use crate::transcode::convert::convert_record;
use crate::transcode::Transform;

/// Structured record to typed Arrow row converter
pub struct RowTransformer {
    output_schema: Option<RecordSchema>,
    cache: SchemaCache<SchemaRef>,
}

impl RowTransformer {
    /// Create a transformer producing the given output schema's fields.
    ///
    /// With no output schema, each record's own schema is used verbatim.
    pub fn new(output_schema: Option<RecordSchema>) -> Self {
        Self {
            output_schema,
            cache: SchemaCache::new(),
        }
    }

    /// Number of distinct schemas derived so far
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }
}

impl Transform for RowTransformer {
    type Output = RecordBatch;

    fn transform(&mut self, record: &StructuredRecord) -> Result<RecordBatch> {
        let effective = self.output_schema.as_ref().unwrap_or_else(|| record.schema());

        let arrow_schema = self
            .cache
            .resolve_with(effective, |schema| Ok(derive_arrow_schema(schema)))?;
        let schema = Arc::clone(arrow_schema);

        let fields = convert_record(record, effective, "")?;
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
        for (field, (_, value)) in schema.fields().iter().zip(&fields) {
            columns.push(build_array(&[unwrap_union(value)], field.data_type())?);
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

/// Derive the Arrow schema for a semantic record schema.
///
/// The nullable wrapper never appears as a type of its own; it surfaces as
/// field (or item/value) nullability, the way Arrow expresses it.
pub fn derive_arrow_schema(record: &RecordSchema) -> SchemaRef {
    Arc::new(ArrowSchema::new(record_fields(record)))
}

fn record_fields(record: &RecordSchema) -> Vec<Field> {
    record
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), arrow_type(f.schema()), f.schema().is_nullable()))
        .collect()
}

fn arrow_type(schema: &Schema) -> DataType {
    match schema {
        Schema::Bool => DataType::Boolean,
        Schema::Int32 => DataType::Int32,
        Schema::Int64 => DataType::Int64,
        Schema::Float32 => DataType::Float32,
        Schema::Float64 => DataType::Float64,
        Schema::Bytes => DataType::Binary,
        Schema::String | Schema::Enum(_) => DataType::Utf8,
        Schema::Array(element) => DataType::List(Arc::new(Field::new(
            "item",
            arrow_type(element),
            element.is_nullable(),
        ))),
        Schema::Map(value) => {
            let entries = Fields::from(vec![
                Field::new("key", DataType::Utf8, false),
                Field::new("value", arrow_type(value), value.is_nullable()),
            ]);
            DataType::Map(
                Arc::new(Field::new("entries", DataType::Struct(entries), false)),
                false,
            )
        }
        Schema::Record(nested) => DataType::Struct(Fields::from(record_fields(nested))),
        Schema::Nullable(inner) => arrow_type(inner),
    }
}

/// Strip the union wrapper the converter emits for nullable values; a null
/// branch reads as an absent cell.
fn unwrap_union(value: &GenericValue) -> Option<&GenericValue> {
    match value {
        GenericValue::Union(_, inner) => unwrap_union(inner),
        GenericValue::Null => None,
        other => Some(other),
    }
}

fn validity(mask: &[bool]) -> Option<NullBuffer> {
    if mask.iter().all(|&valid| valid) {
        None
    } else {
        Some(NullBuffer::from(mask.to_vec()))
    }
}

/// Build an Arrow array of the given type from converted generic values
fn build_array(values: &[Option<&GenericValue>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Boolean(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int32 => {
            let arr: Int32Array = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Long(i)) => Some(*i),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float32 => {
            let arr: Float32Array = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Float(f)) => Some(*f),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Double(f)) => Some(*f),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Binary => {
            let arr: BinaryArray = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::Bytes(b)) => Some(b.as_slice()),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| match v {
                    Some(GenericValue::String(s)) => Some(s.as_str()),
                    Some(GenericValue::Enum(_, symbol)) => Some(symbol.as_str()),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Map(entries_field, ordered) => build_map_array(values, entries_field, *ordered),

        DataType::Struct(fields) => build_struct_array(values, fields),

        other => Err(Error::output(format!(
            "no Arrow builder for type {other:?}"
        ))),
    }
}

/// Build a list array from converted generic arrays
fn build_list_array(values: &[Option<&GenericValue>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&GenericValue>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];
    let mut mask: Vec<bool> = Vec::with_capacity(values.len());

    for value in values {
        if let Some(GenericValue::Array(items)) = value {
            for item in items {
                all_items.push(unwrap_union(item));
            }
            mask.push(true);
        } else {
            mask.push(false);
        }
        let offset = i32::try_from(all_items.len()).map_err(|_| Error::Output {
            message: "Array too large for i32 offset".to_string(),
        })?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());

    let list_array = ListArray::new(Arc::clone(field), offset_buffer, items_array, validity(&mask));
    Ok(Arc::new(list_array))
}

/// Build a map array from converted generic maps.
///
/// Entries are emitted in key order; the input mapping carries no
/// insertion order to preserve.
fn build_map_array(
    values: &[Option<&GenericValue>],
    entries_field: &Arc<Field>,
    ordered: bool,
) -> Result<ArrayRef> {
    let DataType::Struct(entry_fields) = entries_field.data_type() else {
        return Err(Error::output(format!(
            "map entries must be a struct, got {:?}",
            entries_field.data_type()
        )));
    };
    let value_type = entry_fields[1].data_type();

    let mut all_keys: Vec<&str> = Vec::new();
    let mut all_values: Vec<Option<&GenericValue>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];
    let mut mask: Vec<bool> = Vec::with_capacity(values.len());

    for value in values {
        if let Some(GenericValue::Map(entries)) = value {
            let mut sorted: Vec<_> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in sorted {
                all_keys.push(key.as_str());
                all_values.push(unwrap_union(item));
            }
            mask.push(true);
        } else {
            mask.push(false);
        }
        let offset = i32::try_from(all_keys.len()).map_err(|_| Error::Output {
            message: "Map too large for i32 offset".to_string(),
        })?;
        offsets.push(offset);
    }

    let keys_array: ArrayRef = Arc::new(StringArray::from_iter_values(all_keys));
    let values_array = build_array(&all_values, value_type)?;
    let entries = StructArray::new(entry_fields.clone(), vec![keys_array, values_array], None);

    let map_array = MapArray::new(
        Arc::clone(entries_field),
        OffsetBuffer::new(offsets.into()),
        entries,
        validity(&mask),
        ordered,
    );
    Ok(Arc::new(map_array))
}

/// Build a struct array from converted generic records
fn build_struct_array(values: &[Option<&GenericValue>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for field in fields {
        let child_values: Vec<Option<&GenericValue>> = values
            .iter()
            .map(|v| {
                v.and_then(|v| {
                    if let GenericValue::Record(record_fields) = v {
                        record_fields
                            .iter()
                            .find(|(name, _)| name == field.name())
                            .and_then(|(_, value)| unwrap_union(value))
                    } else {
                        None
                    }
                })
            })
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let mask: Vec<bool> = values
        .iter()
        .map(|v| matches!(v, Some(GenericValue::Record(_))))
        .collect();

    let struct_array = StructArray::new(fields.clone(), child_arrays, validity(&mask));
    Ok(Arc::new(struct_array))
}
