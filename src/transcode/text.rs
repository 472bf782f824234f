//! Delimited-text transformer
//!
//! Produces one flat line per input record: the primitive text form of
//! each output field joined with a single configurable delimiter. Fields
//! of composite type have no unambiguous flat representation and are
//! rejected rather than stringified; the check runs lazily at first use
//! because the effective schema may be the first record's own.

use apache_avro::types::Value as GenericValue;

use crate::error::{Error, Result};
use crate::record::{StructuredRecord, Value};
use crate::schema::RecordSchema;
use crate::transcode::convert::convert;
use crate::transcode::Transform;

/// Default field delimiter
pub const DEFAULT_DELIMITER: &str = "\t";

/// Structured record to delimited text converter
pub struct TextTransformer {
    delimiter: String,
    output_schema: Option<RecordSchema>,
    checked: bool,
}

impl TextTransformer {
    /// Create a transformer joining fields with the given delimiter.
    ///
    /// With no output schema, each record's own schema is used verbatim,
    /// so a record carrying a composite field fails at the first record
    /// processed rather than at configuration time.
    pub fn new(delimiter: impl Into<String>, output_schema: Option<RecordSchema>) -> Self {
        Self {
            delimiter: delimiter.into(),
            output_schema,
            checked: false,
        }
    }

    /// Create a transformer with the default tab delimiter
    pub fn tab_delimited(output_schema: Option<RecordSchema>) -> Self {
        Self::new(DEFAULT_DELIMITER, output_schema)
    }

    fn check_flat(effective: &RecordSchema) -> Result<()> {
        for field in effective.fields() {
            if field.schema().is_composite() {
                return Err(Error::unsupported_type(
                    field.name(),
                    format!(
                        "'{}' has no flat text representation; provide a type that is not array, map, or record",
                        field.schema().non_nullable().kind_name()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Transform for TextTransformer {
    type Output = String;

    fn transform(&mut self, record: &StructuredRecord) -> Result<String> {
        let effective = self.output_schema.as_ref().unwrap_or_else(|| record.schema());

        if !self.checked {
            Self::check_flat(effective)?;
            self.checked = true;
        }

        let own_schema = record.schema();
        let mut resolved = Vec::with_capacity(effective.fields().len());
        for field in effective.fields() {
            let input_field = own_schema
                .field(field.name())
                .ok_or_else(|| Error::missing_field(field.name()))?;
            resolved.push(input_field);
        }

        let mut parts = Vec::with_capacity(resolved.len());
        for input_field in resolved {
            let value = record.get(input_field.name()).unwrap_or(&Value::Null);
            let converted = convert(value, input_field.schema(), input_field.name())?;
            parts.push(primitive_text(&converted));
        }

        Ok(parts.join(&self.delimiter))
    }
}

/// Render a converted primitive as text; the null branch of a nullable
/// field reads as an empty string.
fn primitive_text(value: &GenericValue) -> String {
    match value {
        GenericValue::Union(_, inner) => primitive_text(inner),
        GenericValue::Null => String::new(),
        GenericValue::Boolean(b) => b.to_string(),
        GenericValue::Int(i) => i.to_string(),
        GenericValue::Long(i) => i.to_string(),
        GenericValue::Float(f) => format!("{f:?}"),
        GenericValue::Double(f) => format!("{f:?}"),
        GenericValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        GenericValue::String(s) => s.clone(),
        GenericValue::Enum(_, symbol) => symbol.clone(),
        other => format!("{other:?}"),
    }
}
