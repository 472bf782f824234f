//! Tests for the transcoding core

use super::*;
use crate::error::Error;
use crate::record::{StructuredRecord, Value};
use crate::schema::{Field, RecordSchema, Schema};
use crate::types::OutputFormat;
use apache_avro::types::Value as GenericValue;
use arrow::array::{Array, BooleanArray, Int32Array, ListArray, StringArray, StructArray};
use std::collections::HashMap;
use std::sync::Arc;
use test_case::test_case;

// ============================================================================
// Fixtures
// ============================================================================

fn full_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new(
            "full",
            vec![
                Field::of("bool_field", Schema::nullable_of(Schema::Bool)),
                Field::of("int_field", Schema::nullable_of(Schema::Int32)),
                Field::of("long_field", Schema::nullable_of(Schema::Int64)),
                Field::of("float_field", Schema::nullable_of(Schema::Float32)),
                Field::of("double_field", Schema::nullable_of(Schema::Float64)),
                Field::of("bytes_field", Schema::nullable_of(Schema::Bytes)),
                Field::of("string_field", Schema::String),
                Field::of(
                    "enum_field",
                    Schema::nullable_of(Schema::enum_with(["A", "B", "C"])),
                ),
                Field::of("array", Schema::array_of(Schema::Int32)),
                Field::of("map", Schema::map_of(Schema::Int32)),
                Field::of("union", Schema::nullable_of(Schema::String)),
            ],
        )
        .unwrap(),
    )
}

fn flat_schema() -> RecordSchema {
    RecordSchema::new(
        "valid",
        vec![
            Field::of("bool_field", Schema::nullable_of(Schema::Bool)),
            Field::of("int_field", Schema::nullable_of(Schema::Int32)),
            Field::of("long_field", Schema::nullable_of(Schema::Int64)),
            Field::of("float_field", Schema::nullable_of(Schema::Float32)),
            Field::of("double_field", Schema::nullable_of(Schema::Float64)),
            Field::of("bytes_field", Schema::nullable_of(Schema::Bytes)),
            Field::of("string_field", Schema::String),
            Field::of(
                "enum_field",
                Schema::nullable_of(Schema::enum_with(["A", "B", "C"])),
            ),
        ],
    )
    .unwrap()
}

fn nonnull_record() -> StructuredRecord {
    StructuredRecord::builder(full_schema())
        .set("bool_field", false)
        .set("int_field", 1i32)
        .set("long_field", 1i64)
        .set("float_field", 1.0f32)
        .set("double_field", 1.0f64)
        .set("bytes_field", Vec::<u8>::new())
        .set("string_field", "String")
        .set("enum_field", "A")
        .set(
            "array",
            vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)],
        )
        .set(
            "map",
            HashMap::from([
                ("1".to_string(), Value::Int32(1)),
                ("2".to_string(), Value::Int32(2)),
                ("3".to_string(), Value::Int32(3)),
            ]),
        )
        .set("union", None::<String>)
        .build()
        .unwrap()
}

fn null_record() -> StructuredRecord {
    StructuredRecord::builder(full_schema())
        .set("bool_field", None::<bool>)
        .set("int_field", None::<i32>)
        .set("long_field", 1i64)
        .set("float_field", 1.0f32)
        .set("double_field", 1.0f64)
        .set("bytes_field", None::<Vec<u8>>)
        .set("string_field", "String")
        .set("enum_field", "A")
        .set(
            "array",
            vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)],
        )
        .set("map", HashMap::from([("1".to_string(), Value::Int32(1))]))
        .set("union", None::<String>)
        .build()
        .unwrap()
}

// ============================================================================
// Validator
// ============================================================================

#[test]
fn test_validator_accepts_subset_projection() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("string_field", Schema::String),
            Field::of("int_field", Schema::nullable_of(Schema::Int32)),
        ],
    )
    .unwrap();

    for format in [OutputFormat::Columnar, OutputFormat::Row, OutputFormat::Text] {
        assert!(check(&output, &full_schema(), format).is_empty());
        validate(&output, &full_schema(), format).unwrap();
    }
}

#[test]
fn test_validator_reports_missing_field() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("string_field", Schema::String),
            Field::of("absent", Schema::Int32),
        ],
    )
    .unwrap();

    let violations = check(&output, &full_schema(), OutputFormat::Columnar);
    assert_eq!(
        violations,
        vec![Violation::MissingField {
            field: "absent".to_string()
        }]
    );
    assert!(matches!(
        validate(&output, &full_schema(), OutputFormat::Columnar),
        Err(Error::MissingField { field }) if field == "absent"
    ));
}

#[test_case("array" ; "array field")]
#[test_case("map" ; "map field")]
fn test_validator_rejects_composites_for_text(field_name: &str) {
    let input = full_schema();
    let output = RecordSchema::new(
        "out",
        vec![Field::of(
            field_name,
            input.field(field_name).unwrap().schema().clone(),
        )],
    )
    .unwrap();

    let violations = check(&output, &input, OutputFormat::Text);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        Violation::UnsupportedType { field, .. } if field == field_name
    ));

    // The same projection is fine for the nested formats.
    assert!(check(&output, &input, OutputFormat::Columnar).is_empty());
    assert!(check(&output, &input, OutputFormat::Row).is_empty());
}

#[test]
fn test_validator_rejects_nullable_record_for_text() {
    let nested = RecordSchema::new("inner", vec![Field::of("x", Schema::Int32)]).unwrap();
    let input = RecordSchema::new(
        "in",
        vec![Field::of(
            "rec",
            Schema::nullable_of(Schema::Record(nested)),
        )],
    )
    .unwrap();
    let output = RecordSchema::new(
        "out",
        vec![Field::of("rec", input.field("rec").unwrap().schema().clone())],
    )
    .unwrap();

    let violations = check(&output, &input, OutputFormat::Text);
    assert!(matches!(
        &violations[0],
        Violation::UnsupportedType { kind: "record", .. }
    ));
}

#[test]
fn test_validator_collects_every_violation() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("absent", Schema::Int32),
            Field::of("array", Schema::array_of(Schema::Int32)),
            Field::of("map", Schema::map_of(Schema::Int32)),
        ],
    )
    .unwrap();

    let violations = check(&output, &full_schema(), OutputFormat::Text);
    assert_eq!(violations.len(), 3);
    assert_eq!(violations[0].field(), "absent");
    assert_eq!(violations[1].field(), "array");
    assert_eq!(violations[2].field(), "map");
}

// ============================================================================
// Schema cache
// ============================================================================

#[test]
fn test_cache_hits_on_structural_equality() {
    let mut cache: SchemaCache<u32> = SchemaCache::new();
    let mut derivations = 0u32;

    let a = flat_schema();
    let b = flat_schema();

    let first = *cache
        .resolve_with(&a, |_| {
            derivations += 1;
            Ok(derivations)
        })
        .unwrap();
    let second = *cache
        .resolve_with(&b, |_| {
            derivations += 1;
            Ok(derivations)
        })
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(derivations, 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_separates_distinct_shapes() {
    let mut cache: SchemaCache<String> = SchemaCache::new();

    let a = RecordSchema::new("r", vec![Field::of("x", Schema::Int32)]).unwrap();
    let b = RecordSchema::new("r", vec![Field::of("x", Schema::Int64)]).unwrap();

    cache.resolve_with(&a, |s| Ok(s.name().to_string())).unwrap();
    cache.resolve_with(&b, |s| Ok(s.name().to_string())).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_propagates_derivation_failure() {
    let mut cache: SchemaCache<u32> = SchemaCache::new();
    let schema = flat_schema();

    let result = cache.resolve_with(&schema, |_| Err(Error::output("boom")));
    assert!(result.is_err());
    // The failed derivation leaves no entry behind.
    assert!(cache.is_empty());
}

// ============================================================================
// Field converter
// ============================================================================

#[test]
fn test_convert_primitives_pass_through() {
    assert_eq!(
        convert(&Value::Bool(true), &Schema::Bool, "f").unwrap(),
        GenericValue::Boolean(true)
    );
    assert_eq!(
        convert(&Value::Int32(7), &Schema::Int32, "f").unwrap(),
        GenericValue::Int(7)
    );
    assert_eq!(
        convert(&Value::Int64(7), &Schema::Int64, "f").unwrap(),
        GenericValue::Long(7)
    );
    assert_eq!(
        convert(&Value::String("x".into()), &Schema::String, "f").unwrap(),
        GenericValue::String("x".into())
    );
}

#[test]
fn test_convert_normalizes_bytes_forms() {
    let from_vec = convert(&Value::from(vec![1u8, 2]), &Schema::Bytes, "f").unwrap();
    let from_handle = convert(
        &Value::from(bytes::Bytes::from_static(&[1, 2])),
        &Schema::Bytes,
        "f",
    )
    .unwrap();
    assert_eq!(from_vec, from_handle);
    assert_eq!(from_vec, GenericValue::Bytes(vec![1, 2]));
}

#[test]
fn test_convert_enum_symbol_without_validation() {
    // Symbol-set enforcement belongs to the derived target schema.
    let converted = convert(
        &Value::String("Z".into()),
        &Schema::enum_with(["A", "B"]),
        "f",
    )
    .unwrap();
    assert_eq!(converted, GenericValue::String("Z".into()));
}

#[test]
fn test_convert_array_preserves_order() {
    let value = Value::Array(vec![Value::Int32(3), Value::Int32(1), Value::Int32(2)]);
    let converted = convert(&value, &Schema::array_of(Schema::Int32), "f").unwrap();
    assert_eq!(
        converted,
        GenericValue::Array(vec![
            GenericValue::Int(3),
            GenericValue::Int(1),
            GenericValue::Int(2)
        ])
    );
}

#[test]
fn test_convert_map_converts_values() {
    let value = Value::Map(HashMap::from([("k".to_string(), Value::Int64(9))]));
    let converted = convert(&value, &Schema::map_of(Schema::Int64), "f").unwrap();
    match converted {
        GenericValue::Map(entries) => {
            assert_eq!(entries.get("k"), Some(&GenericValue::Long(9)));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_convert_nullable_branches() {
    let schema = Schema::nullable_of(Schema::Int32);
    assert_eq!(
        convert(&Value::Null, &schema, "f").unwrap(),
        GenericValue::Union(0, Box::new(GenericValue::Null))
    );
    assert_eq!(
        convert(&Value::Int32(4), &schema, "f").unwrap(),
        GenericValue::Union(1, Box::new(GenericValue::Int(4)))
    );
}

#[test]
fn test_convert_rejects_kind_mismatch() {
    let result = convert(&Value::String("oops".into()), &Schema::Int32, "count");
    assert!(matches!(
        result,
        Err(Error::UnsupportedType { field, .. }) if field == "count"
    ));
}

#[test]
fn test_convert_rejects_null_for_non_nullable() {
    let result = convert(&Value::Null, &Schema::String, "name");
    assert!(matches!(result, Err(Error::UnsupportedType { .. })));
}

#[test]
fn test_convert_record_reports_nested_path() {
    let inner = RecordSchema::new("inner", vec![Field::of("deep", Schema::Int32)]).unwrap();
    let outer = Arc::new(
        RecordSchema::new("outer", vec![Field::of("nested", Schema::Record(inner))]).unwrap(),
    );

    // The nested record's own schema lacks the declared field.
    let empty_inner = Arc::new(RecordSchema::new("inner", Vec::new()).unwrap());
    let nested = StructuredRecord::builder(empty_inner).build().unwrap();
    let record = StructuredRecord::builder(outer)
        .set("nested", nested)
        .build()
        .unwrap();

    let result = convert_record(&record, record.schema(), "");
    assert!(matches!(
        result,
        Err(Error::MissingField { field }) if field == "nested.deep"
    ));
}

// ============================================================================
// Columnar transformer
// ============================================================================

#[test]
fn test_columnar_projection_law() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("string_field", Schema::String),
            Field::of("int_field", Schema::nullable_of(Schema::Int32)),
        ],
    )
    .unwrap();

    let mut transformer = ColumnarTransformer::new(Some(output));
    let result = transformer.transform(&nonnull_record()).unwrap();

    match result.value() {
        GenericValue::Record(fields) => {
            let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(names, vec!["string_field", "int_field"]);
            assert_eq!(fields[0].1, GenericValue::String("String".into()));
            assert_eq!(
                fields[1].1,
                GenericValue::Union(1, Box::new(GenericValue::Int(1)))
            );
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn test_columnar_null_becomes_union_null() {
    let output = RecordSchema::new(
        "out",
        vec![Field::of("bool_field", Schema::nullable_of(Schema::Bool))],
    )
    .unwrap();

    let mut transformer = ColumnarTransformer::new(Some(output));
    let result = transformer.transform(&null_record()).unwrap();

    match result.value() {
        GenericValue::Record(fields) => {
            assert_eq!(
                fields[0].1,
                GenericValue::Union(0, Box::new(GenericValue::Null))
            );
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn test_columnar_missing_field() {
    let output =
        RecordSchema::new("out", vec![Field::of("absent", Schema::String)]).unwrap();
    let mut transformer = ColumnarTransformer::new(Some(output));
    assert!(matches!(
        transformer.transform(&nonnull_record()),
        Err(Error::MissingField { field }) if field == "absent"
    ));
}

#[test]
fn test_columnar_schema_cached_across_records() {
    // No configured output schema: each record contributes its own schema
    // instance, structurally equal to the last.
    let mut transformer = ColumnarTransformer::new(None);
    let first = transformer.transform(&nonnull_record()).unwrap();
    let second = transformer.transform(&null_record()).unwrap();

    assert_eq!(transformer.cached_schemas(), 1);
    assert!(Arc::ptr_eq(&first.into_parts().0, &second.into_parts().0));
}

#[test]
fn test_columnar_is_idempotent() {
    let mut transformer = ColumnarTransformer::new(None);
    let record = nonnull_record();
    let first = transformer.transform(&record).unwrap();
    let second = transformer.transform(&record).unwrap();
    assert_eq!(first.value(), second.value());
}

#[test]
fn test_columnar_value_matches_derived_schema() {
    let mut transformer = ColumnarTransformer::new(Some(flat_schema()));
    let result = transformer.transform(&nonnull_record()).unwrap();

    // The generic record must resolve against the schema it travels with.
    let (schema, value) = result.into_parts();
    apache_avro::to_avro_datum(&schema, value).unwrap();
}

// ============================================================================
// Row transformer
// ============================================================================

#[test]
fn test_row_batch_shape_and_values() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("string_field", Schema::String),
            Field::of("int_field", Schema::nullable_of(Schema::Int32)),
            Field::of("bool_field", Schema::nullable_of(Schema::Bool)),
        ],
    )
    .unwrap();

    let mut transformer = RowTransformer::new(Some(output));
    let batch = transformer.transform(&nonnull_record()).unwrap();

    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 3);
    assert!(!batch.schema().field(0).is_nullable());
    assert!(batch.schema().field(1).is_nullable());

    let strings = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(strings.value(0), "String");

    let ints = batch
        .column(1)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(ints.value(0), 1);

    let bools = batch
        .column(2)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .unwrap();
    assert!(!bools.value(0));
}

#[test]
fn test_row_null_becomes_arrow_null() {
    let output = RecordSchema::new(
        "out",
        vec![Field::of("int_field", Schema::nullable_of(Schema::Int32))],
    )
    .unwrap();

    let mut transformer = RowTransformer::new(Some(output));
    let batch = transformer.transform(&null_record()).unwrap();
    assert!(batch.column(0).is_null(0));
}

#[test]
fn test_row_preserves_nested_composites() {
    let actor_schema = RecordSchema::new(
        "actor",
        vec![
            Field::of("id", Schema::Int64),
            Field::of("name", Schema::String),
        ],
    )
    .unwrap();
    let input_schema = Arc::new(
        RecordSchema::new(
            "event",
            vec![
                Field::of("tags", Schema::array_of(Schema::String)),
                Field::of("actor", Schema::Record(actor_schema.clone())),
            ],
        )
        .unwrap(),
    );

    let actor = StructuredRecord::builder(Arc::new(actor_schema))
        .set("id", 42i64)
        .set("name", "robot")
        .build()
        .unwrap();

    let record = StructuredRecord::builder(Arc::clone(&input_schema))
        .set(
            "tags",
            vec![Value::String("a".into()), Value::String("b".into())],
        )
        .set("actor", actor)
        .build()
        .unwrap();

    let mut transformer = RowTransformer::new(None);
    let batch = transformer.transform(&record).unwrap();

    let tags = batch
        .column(0)
        .as_any()
        .downcast_ref::<ListArray>()
        .unwrap();
    let items = tags.value(0);
    let items = items.as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items.value(0), "a");

    let actor_col = batch
        .column(1)
        .as_any()
        .downcast_ref::<StructArray>()
        .unwrap();
    assert_eq!(actor_col.num_columns(), 2);
}

#[test]
fn test_row_missing_field() {
    let output = RecordSchema::new("out", vec![Field::of("absent", Schema::Int32)]).unwrap();
    let mut transformer = RowTransformer::new(Some(output));
    assert!(matches!(
        transformer.transform(&nonnull_record()),
        Err(Error::MissingField { .. })
    ));
}

#[test]
fn test_row_is_idempotent() {
    let mut transformer = RowTransformer::new(Some(flat_schema()));
    let record = nonnull_record();
    let first = transformer.transform(&record).unwrap();
    let second = transformer.transform(&record).unwrap();
    assert_eq!(first, second);
    assert_eq!(transformer.cached_schemas(), 1);
}

// ============================================================================
// Text transformer
// ============================================================================

#[test]
fn test_text_transform_full_row() {
    let mut transformer = TextTransformer::new("\t", Some(flat_schema()));
    assert_eq!(
        transformer.transform(&nonnull_record()).unwrap(),
        "false\t1\t1\t1.0\t1.0\t\tString\tA"
    );
    assert_eq!(
        transformer.transform(&null_record()).unwrap(),
        "\t\t1\t1.0\t1.0\t\tString\tA"
    );
}

#[test]
fn test_text_transform_example_scenarios() {
    let schema = Arc::new(
        RecordSchema::new(
            "example",
            vec![
                Field::of("bool_field", Schema::nullable_of(Schema::Bool)),
                Field::of("int_field", Schema::nullable_of(Schema::Int32)),
                Field::of("string_field", Schema::String),
            ],
        )
        .unwrap(),
    );

    let mut transformer = TextTransformer::tab_delimited(None);

    let populated = StructuredRecord::builder(Arc::clone(&schema))
        .set("bool_field", false)
        .set("int_field", 1i32)
        .set("string_field", "String")
        .build()
        .unwrap();
    assert_eq!(transformer.transform(&populated).unwrap(), "false\t1\tString");

    let nulled = StructuredRecord::builder(schema)
        .set("bool_field", None::<bool>)
        .set("int_field", None::<i32>)
        .set("string_field", "String")
        .build()
        .unwrap();
    assert_eq!(transformer.transform(&nulled).unwrap(), "\t\tString");
}

#[test]
fn test_text_custom_delimiter() {
    let mut transformer = TextTransformer::new("|", Some(flat_schema()));
    let line = transformer.transform(&nonnull_record()).unwrap();
    assert_eq!(line, "false|1|1|1.0|1.0||String|A");
}

#[test]
fn test_text_rejects_declared_composite_schema() {
    let output = RecordSchema::new(
        "invalid",
        vec![Field::of("array", Schema::array_of(Schema::Int32))],
    )
    .unwrap();
    let mut transformer = TextTransformer::new("\t", Some(output));
    assert!(matches!(
        transformer.transform(&nonnull_record()),
        Err(Error::UnsupportedType { field, .. }) if field == "array"
    ));
}

#[test]
fn test_text_rejects_effective_schema_at_first_record() {
    // No output schema configured, so the first record's own schema is the
    // effective one; it carries composite fields.
    let mut transformer = TextTransformer::tab_delimited(None);
    assert!(matches!(
        transformer.transform(&nonnull_record()),
        Err(Error::UnsupportedType { .. })
    ));
}

#[test]
fn test_text_rejects_empty_composites_too() {
    let schema = Arc::new(
        RecordSchema::new(
            "r",
            vec![Field::of("array", Schema::array_of(Schema::Int32))],
        )
        .unwrap(),
    );
    let record = StructuredRecord::builder(schema)
        .set("array", Vec::<Value>::new())
        .build()
        .unwrap();

    let mut transformer = TextTransformer::tab_delimited(None);
    assert!(matches!(
        transformer.transform(&record),
        Err(Error::UnsupportedType { .. })
    ));
}

#[test]
fn test_text_missing_field_detected_before_conversion() {
    let output = RecordSchema::new(
        "out",
        vec![
            Field::of("string_field", Schema::String),
            Field::of("absent", Schema::String),
        ],
    )
    .unwrap();
    let mut transformer = TextTransformer::new("\t", Some(output));
    assert!(matches!(
        transformer.transform(&nonnull_record()),
        Err(Error::MissingField { field }) if field == "absent"
    ));
}

#[test]
fn test_text_is_idempotent() {
    let mut transformer = TextTransformer::new("\t", Some(flat_schema()));
    let record = nonnull_record();
    let first = transformer.transform(&record).unwrap();
    let second = transformer.transform(&record).unwrap();
    assert_eq!(first, second);
}
