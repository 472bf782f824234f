//! Output-schema compatibility validation
//!
//! Runs once per pipeline configuration, before any record is processed,
//! so incompatible projections fail the job up front rather than on the
//! first record. A record mismatching its own schema at runtime is still
//! caught by the transformers.

use crate::error::Error;
use crate::schema::RecordSchema;
use crate::types::OutputFormat;

/// One incompatibility between an output schema and an input schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// An output field has no counterpart in the input schema
    MissingField {
        /// Name of the missing field
        field: String,
    },
    /// An output field's resolved type is disallowed for the selected format
    UnsupportedType {
        /// Name of the offending field
        field: String,
        /// Resolved kind name of the field
        kind: &'static str,
    },
}

impl Violation {
    /// Name of the field this violation concerns
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingField { field } | Violation::UnsupportedType { field, .. } => field,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingField { field } => {
                write!(f, "input schema does not contain the '{field}' field")
            }
            Violation::UnsupportedType { field, kind } => {
                write!(f, "field '{field}' is of unexpected type '{kind}'")
            }
        }
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        match violation {
            Violation::MissingField { field } => Error::missing_field(field),
            Violation::UnsupportedType { field, kind } => Error::unsupported_type(
                field,
                format!("'{kind}' has no flat text representation; provide a type that is not array, map, or record"),
            ),
        }
    }
}

/// Collect every incompatibility between `output` and `input` for the
/// selected format.
///
/// Every output field must exist in the input schema. For the text format
/// only, a field whose resolved type (after stripping the nullable
/// wrapper) is an array, map, or record is additionally rejected; there is
/// no unambiguous flat text form for composites, so they fail rather than
/// silently stringify. Columnar and row formats permit arbitrary nesting.
pub fn check(
    output: &RecordSchema,
    input: &RecordSchema,
    format: OutputFormat,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for field in output.fields() {
        let Some(input_field) = input.field(field.name()) else {
            violations.push(Violation::MissingField {
                field: field.name().to_string(),
            });
            continue;
        };

        if format == OutputFormat::Text && input_field.schema().is_composite() {
            violations.push(Violation::UnsupportedType {
                field: field.name().to_string(),
                kind: input_field.schema().non_nullable().kind_name(),
            });
        }
    }

    violations
}

/// Validate `output` against `input`, failing on the first incompatibility.
///
/// Pure check with no side effects; callers that want every violation (to
/// report them all at once) use [`check`] directly.
pub fn validate(
    output: &RecordSchema,
    input: &RecordSchema,
    format: OutputFormat,
) -> crate::error::Result<()> {
    match check(output, input, format).into_iter().next() {
        Some(violation) => Err(violation.into()),
        None => Ok(()),
    }
}
