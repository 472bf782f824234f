//! Record value types

use crate::error::{Error, Result};
use crate::schema::RecordSchema;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// A dynamically typed field value, mirroring the schema kind set.
///
/// Enum symbols are carried as [`Value::String`]; byte buffers accept
/// either a raw `Vec<u8>` or a [`Bytes`] handle at construction and are
/// stored in one canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null, only legal under a nullable schema node
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
    /// Byte buffer
    Bytes(Bytes),
    /// UTF-8 string, also carrying enum symbols
    String(String),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// String-keyed mapping
    Map(HashMap<String, Value>),
    /// Nested record
    Record(StructuredRecord),
}

impl Value {
    /// Short kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int32(_) => "int",
            Value::Int64(_) => "long",
            Value::Float32(_) => "float",
            Value::Float64(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(v: HashMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<StructuredRecord> for Value {
    fn from(v: StructuredRecord) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// A self-describing row: field values paired with their schema.
///
/// The schema is shared, not owned, so cloning a record does not copy the
/// schema tree. Values are expected to match the schema's declared kinds;
/// the transcoder surfaces mismatches as it converts.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    schema: Arc<RecordSchema>,
    values: HashMap<String, Value>,
}

impl StructuredRecord {
    /// Start building a record for the given schema
    pub fn builder(schema: impl Into<Arc<RecordSchema>>) -> RecordBuilder {
        RecordBuilder {
            schema: schema.into(),
            values: HashMap::new(),
        }
    }

    /// The record's own schema
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Shared handle to the record's schema
    pub fn schema_ref(&self) -> Arc<RecordSchema> {
        Arc::clone(&self.schema)
    }

    /// Look up a field value; unset fields read as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Builder for [`StructuredRecord`]
#[derive(Debug)]
pub struct RecordBuilder {
    schema: Arc<RecordSchema>,
    values: HashMap<String, Value>,
}

impl RecordBuilder {
    /// Set a field value
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Finish the record, rejecting values for fields the schema does not
    /// declare
    pub fn build(self) -> Result<StructuredRecord> {
        for name in self.values.keys() {
            if self.schema.field(name).is_none() {
                return Err(Error::missing_field(name));
            }
        }
        Ok(StructuredRecord {
            schema: self.schema,
            values: self.values,
        })
    }
}
