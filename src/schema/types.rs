//! Schema tree types

use crate::error::{Error, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A recursive type description with a closed kind set.
///
/// Equality and hashing are structural: two schemas with identical shape,
/// field order, and names compare equal regardless of where they were
/// parsed, which is what makes fingerprint-keyed caching work when every
/// decoded record carries its own schema instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Byte buffer
    Bytes,
    /// UTF-8 string
    String,
    /// Enumeration over a fixed symbol set
    Enum(Vec<String>),
    /// Ordered sequence of one element type
    Array(Box<Schema>),
    /// String-keyed mapping to one value type
    Map(Box<Schema>),
    /// Named record with ordered fields
    Record(RecordSchema),
    /// Null or exactly one other kind; the only union form supported
    Nullable(Box<Schema>),
}

impl Schema {
    /// Wrap a schema into its nullable form.
    ///
    /// Wrapping an already-nullable schema is a no-op rather than a
    /// double union.
    pub fn nullable_of(inner: Schema) -> Schema {
        match inner {
            Schema::Nullable(_) => inner,
            other => Schema::Nullable(Box::new(other)),
        }
    }

    /// An array of the given element schema
    pub fn array_of(element: Schema) -> Schema {
        Schema::Array(Box::new(element))
    }

    /// A map from string keys to the given value schema
    pub fn map_of(value: Schema) -> Schema {
        Schema::Map(Box::new(value))
    }

    /// An enum over the given symbols
    pub fn enum_with<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Schema {
        Schema::Enum(symbols.into_iter().map(Into::into).collect())
    }

    /// A record schema with the given name and fields
    pub fn record_of<S: Into<String>>(name: S, fields: Vec<Field>) -> Result<Schema> {
        Ok(Schema::Record(RecordSchema::new(name, fields)?))
    }

    /// Whether this node is the nullable wrapper
    pub fn is_nullable(&self) -> bool {
        matches!(self, Schema::Nullable(_))
    }

    /// The schema with any nullable wrapper stripped
    pub fn non_nullable(&self) -> &Schema {
        match self {
            Schema::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Whether the resolved type is a composite (array, map, or record)
    pub fn is_composite(&self) -> bool {
        matches!(
            self.non_nullable(),
            Schema::Array(_) | Schema::Map(_) | Schema::Record(_)
        )
    }

    /// The record schema, if this resolves to a record
    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self.non_nullable() {
            Schema::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Bool => "boolean",
            Schema::Int32 => "int",
            Schema::Int64 => "long",
            Schema::Float32 => "float",
            Schema::Float64 => "double",
            Schema::Bytes => "bytes",
            Schema::String => "string",
            Schema::Enum(_) => "enum",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Record(_) => "record",
            Schema::Nullable(_) => "union",
        }
    }

    /// Structural fingerprint used as the derived-schema cache key.
    ///
    /// Pure function of the tree shape; structurally equal schemas always
    /// produce the same fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A named field within a record schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    schema: Schema,
}

impl Field {
    /// Create a field
    pub fn of(name: impl Into<String>, schema: Schema) -> Field {
        Field {
            name: name.into(),
            schema,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// A named record schema owning an ordered sequence of uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Create a record schema, rejecting duplicate field names
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<RecordSchema> {
        let name = name.into();
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(Error::malformed_schema(format!(
                    "duplicate field '{}' in record '{}'",
                    field.name(),
                    name
                )));
            }
        }
        Ok(RecordSchema { name, fields })
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declared order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Structural fingerprint used as the derived-schema cache key
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
