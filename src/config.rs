//! Sink configuration
//!
//! Configuration for one sink job, loaded from YAML. The embedded output
//! schema and file system properties are JSON strings, matching how the
//! surrounding platform hands them over.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{Error, Result};
use crate::schema::RecordSchema;
use crate::transcode::{self, DEFAULT_DELIMITER};
use crate::types::{OutputFormat, StringMap};

/// Complete sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Name used to reference this sink in lineage and logs
    pub reference_name: String,

    /// Path to the directory or file output is written to
    pub path: String,

    /// Target representation to produce
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Output schema of the records to write, as a JSON schema description.
    /// Required for the columnar and row formats. If left empty for the
    /// text format, the schema of input records is used. Must be a subset
    /// of the input record schema; unions are only supported as nullable
    /// types, and array, map, and record fields are not supported with the
    /// text format.
    #[serde(default)]
    pub schema: Option<String>,

    /// Field delimiter for text format output. Defaults to tab.
    #[serde(default)]
    pub field_delimiter: Option<String>,

    /// A JSON string representing a map of properties needed by the
    /// file system, pre-resolved by the credential layer and passed
    /// through opaquely.
    #[serde(default)]
    pub file_system_properties: Option<String>,
}

impl SinkConfig {
    /// Load a sink configuration from YAML text
    pub fn from_yaml(text: &str) -> Result<SinkConfig> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// The configured output schema, parsed
    pub fn output_schema(&self) -> Result<Option<RecordSchema>> {
        match self.schema.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(text) => Ok(Some(RecordSchema::parse_json(text)?)),
            None => Ok(None),
        }
    }

    /// The text-format field delimiter, defaulting to a single tab
    pub fn field_delimiter(&self) -> &str {
        self.field_delimiter
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DELIMITER)
    }

    /// The pre-resolved file system property map
    pub fn file_system_properties(&self) -> Result<StringMap> {
        match self.file_system_properties.as_deref() {
            None => Ok(StringMap::new()),
            Some(text) => {
                serde_json::from_str(text).map_err(|e| Error::InvalidConfigValue {
                    field: "file_system_properties".to_string(),
                    message: format!("unable to parse property map: {e}"),
                })
            }
        }
    }

    /// Validate the configuration on its own
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::InvalidConfigValue {
                field: "path".to_string(),
                message: "output path must not be empty".to_string(),
            });
        }
        if matches!(
            self.output_format,
            OutputFormat::Columnar | OutputFormat::Row
        ) && self.output_schema()?.is_none()
        {
            return Err(Error::missing_config_field("schema"));
        }
        // Parse eagerly so a malformed property map fails the job at
        // configuration time.
        self.file_system_properties()?;
        Ok(())
    }

    /// Validate the configuration against the declared input schema.
    ///
    /// Runs the projection validator once, at configuration time; every
    /// violation is logged before the first one fails the job.
    pub fn validate_against(&self, input_schema: &RecordSchema) -> Result<()> {
        self.validate()?;

        if let Some(output) = self.output_schema()? {
            let violations = transcode::check(&output, input_schema, self.output_format);
            for violation in &violations {
                error!(
                    reference_name = %self.reference_name,
                    field = violation.field(),
                    "invalid output schema: {violation}"
                );
            }
            if let Some(first) = violations.into_iter().next() {
                return Err(first.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Schema};

    fn base_yaml(format: &str) -> String {
        format!(
            "reference_name: orders\npath: /tmp/out\noutput_format: {format}\n"
        )
    }

    fn schema_json() -> String {
        serde_json::json!({
            "type": "record",
            "name": "orders",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "note", "type": ["null", "string"]}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let config = SinkConfig::from_yaml(&base_yaml("text")).unwrap();
        assert_eq!(config.reference_name, "orders");
        assert_eq!(config.output_format, OutputFormat::Text);
        assert_eq!(config.field_delimiter(), "\t");
        assert!(config.output_schema().unwrap().is_none());
    }

    #[test]
    fn test_schema_parsed_from_embedded_json() {
        let mut config = SinkConfig::from_yaml(&base_yaml("columnar")).unwrap();
        config.schema = Some(schema_json());
        let schema = config.output_schema().unwrap().unwrap();
        assert_eq!(schema.name(), "orders");
        assert_eq!(schema.fields().len(), 2);
    }

    #[test]
    fn test_malformed_schema_rejected() {
        let mut config = SinkConfig::from_yaml(&base_yaml("columnar")).unwrap();
        config.schema = Some("{broken".to_string());
        assert!(matches!(
            config.output_schema(),
            Err(Error::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_schema_required_for_nested_formats() {
        for format in ["columnar", "row"] {
            let config = SinkConfig::from_yaml(&base_yaml(format)).unwrap();
            assert!(matches!(
                config.validate(),
                Err(Error::MissingConfigField { field }) if field == "schema"
            ));
        }

        let config = SinkConfig::from_yaml(&base_yaml("text")).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_file_system_properties_passthrough() {
        let mut config = SinkConfig::from_yaml(&base_yaml("text")).unwrap();
        config.file_system_properties =
            Some("{\"fs.adl.oauth2.client.id\": \"abc\"}".to_string());
        let props = config.file_system_properties().unwrap();
        assert_eq!(props.get("fs.adl.oauth2.client.id").map(String::as_str), Some("abc"));

        config.file_system_properties = Some("not json".to_string());
        assert!(matches!(
            config.file_system_properties(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_validate_against_accepts_projection() {
        let mut config = SinkConfig::from_yaml(&base_yaml("columnar")).unwrap();
        config.schema = Some(schema_json());

        let input = RecordSchema::new(
            "input",
            vec![
                Field::of("id", Schema::Int64),
                Field::of("note", Schema::nullable_of(Schema::String)),
                Field::of("ignored", Schema::Bool),
            ],
        )
        .unwrap();
        config.validate_against(&input).unwrap();
    }

    #[test]
    fn test_validate_against_reports_missing_field() {
        let mut config = SinkConfig::from_yaml(&base_yaml("columnar")).unwrap();
        config.schema = Some(schema_json());

        let input = RecordSchema::new("input", vec![Field::of("id", Schema::Int64)]).unwrap();
        assert!(matches!(
            config.validate_against(&input),
            Err(Error::MissingField { field }) if field == "note"
        ));
    }

    #[test]
    fn test_validate_against_rejects_composite_for_text() {
        let mut config = SinkConfig::from_yaml(&base_yaml("text")).unwrap();
        config.schema = Some(
            serde_json::json!({
                "type": "record",
                "name": "out",
                "fields": [
                    {"name": "tags", "type": {"type": "array", "items": "string"}}
                ]
            })
            .to_string(),
        );

        let input = RecordSchema::new(
            "input",
            vec![Field::of("tags", Schema::array_of(Schema::String))],
        )
        .unwrap();
        assert!(matches!(
            config.validate_against(&input),
            Err(Error::UnsupportedType { .. })
        ));
    }
}
