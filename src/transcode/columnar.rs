//! Columnar transformer
//!
//! Produces one self-describing Avro generic record per input record. The
//! Avro schema is derived from the effective output schema through the
//! cache, so structurally repeated schemas are translated once per task,
//! not once per record.

use apache_avro::types::Value as GenericValue;
use apache_avro::Schema as AvroSchema;
use serde_json::json;
use std::sync::Arc;

use crate::error::Result;
use crate::record::StructuredRecord;
use crate::schema::{RecordSchema, Schema};
use crate::transcode::cache::SchemaCache;
use crate::transcode::convert::convert_record;
use crate::transcode::Transform;
use crate::types::JsonValue;

/// A self-describing output value: the generic record together with the
/// Avro schema it was built against.
#[derive(Debug, Clone)]
pub struct ColumnarRecord {
    schema: Arc<AvroSchema>,
    value: GenericValue,
}

impl ColumnarRecord {
    /// The Avro schema travelling with the value
    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    /// Shared handle to the schema, for writers that outlive this record
    pub fn schema_handle(&self) -> &Arc<AvroSchema> {
        &self.schema
    }

    /// The generic record value
    pub fn value(&self) -> &GenericValue {
        &self.value
    }

    /// Split into schema handle and value
    pub fn into_parts(self) -> (Arc<AvroSchema>, GenericValue) {
        (self.schema, self.value)
    }
}

/// Structured record to Avro generic record converter
pub struct ColumnarTransformer {
    output_schema: Option<RecordSchema>,
    cache: SchemaCache<Arc<AvroSchema>>,
}

impl ColumnarTransformer {
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

impl Transform for ColumnarTransformer {
    type Output = ColumnarRecord;

    fn transform(&mut self, record: &StructuredRecord) -> Result<ColumnarRecord> {
        let effective = self.output_schema.as_ref().unwrap_or_else(|| record.schema());

        let avro_schema = self
            .cache
            .resolve_with(effective, |schema| Ok(Arc::new(derive_avro_schema(schema)?)))?;
        let schema = Arc::clone(avro_schema);

        let fields = convert_record(record, effective, "")?;
        Ok(ColumnarRecord {
            schema,
            value: GenericValue::Record(fields),
        })
    }
}

/// Derive the Avro schema for a semantic record schema.
///
/// Each node kind maps deterministically to one Avro construct; the
/// nullable wrapper becomes an explicit `["null", T]` union.
pub fn derive_avro_schema(record: &RecordSchema) -> Result<AvroSchema> {
    let json = record_json(record);
    Ok(AvroSchema::parse_str(&json.to_string())?)
}

fn record_json(record: &RecordSchema) -> JsonValue {
    let fields: Vec<JsonValue> = record
        .fields()
        .iter()
        .map(|f| {
            json!({
                "name": f.name(),
                // Record names are unique, so prefixing keeps synthesized
                // names unique across nested records too.
                "type": type_json(f.schema(), &format!("{}_{}", record.name(), f.name())),
            })
        })
        .collect();
    json!({ "type": "record", "name": record.name(), "fields": fields })
}

fn type_json(schema: &Schema, path: &str) -> JsonValue {
    match schema {
        Schema::Bool => json!("boolean"),
        Schema::Int32 => json!("int"),
        Schema::Int64 => json!("long"),
        Schema::Float32 => json!("float"),
        Schema::Float64 => json!("double"),
        Schema::Bytes => json!("bytes"),
        Schema::String => json!("string"),
        // Avro enums are named types; synthesize a name from the field
        // path, which is unique within the record.
        Schema::Enum(symbols) => json!({
            "type": "enum",
            "name": format!("{}_enum", sanitize(path)),
            "symbols": symbols,
        }),
        Schema::Array(element) => json!({
            "type": "array",
            "items": type_json(element, &format!("{path}_item")),
        }),
        Schema::Map(value) => json!({
            "type": "map",
            "values": type_json(value, &format!("{path}_value")),
        }),
        Schema::Record(nested) => record_json(nested),
        Schema::Nullable(inner) => json!(["null", type_json(inner, path)]),
    }
}

fn sanitize(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
