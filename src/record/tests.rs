//! Tests for structured records

use super::*;
use crate::schema::{Field, RecordSchema, Schema};
use bytes::Bytes;
use std::sync::Arc;

fn user_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new(
            "user",
            vec![
                Field::of("id", Schema::Int64),
                Field::of("name", Schema::String),
                Field::of("email", Schema::nullable_of(Schema::String)),
                Field::of("avatar", Schema::Bytes),
            ],
        )
        .unwrap(),
    )
}

#[test]
fn test_builder_sets_and_reads_fields() {
    let record = StructuredRecord::builder(user_schema())
        .set("id", 7i64)
        .set("name", "Alice")
        .set("email", None::<String>)
        .build()
        .unwrap();

    assert_eq!(record.get("id"), Some(&Value::Int64(7)));
    assert_eq!(record.get("name"), Some(&Value::String("Alice".into())));
    assert_eq!(record.get("email"), Some(&Value::Null));
    assert!(record.get("avatar").is_none());
}

#[test]
fn test_builder_rejects_unknown_field() {
    let result = StructuredRecord::builder(user_schema())
        .set("nickname", "Al")
        .build();
    assert!(matches!(
        result,
        Err(crate::error::Error::MissingField { .. })
    ));
}

#[test]
fn test_bytes_normalize_to_one_form() {
    let from_vec: Value = vec![1u8, 2, 3].into();
    let from_handle: Value = Bytes::from_static(&[1, 2, 3]).into();
    assert_eq!(from_vec, from_handle);
}

#[test]
fn test_option_becomes_null() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some(5i32)), Value::Int32(5));
}

#[test]
fn test_schema_is_shared_not_copied() {
    let schema = user_schema();
    let record = StructuredRecord::builder(Arc::clone(&schema))
        .set("id", 1i64)
        .build()
        .unwrap();
    let clone = record.clone();
    assert!(Arc::ptr_eq(&record.schema_ref(), &clone.schema_ref()));
    assert_eq!(record.schema(), schema.as_ref());
}

#[test]
fn test_nested_record_value() {
    let inner_schema = Arc::new(
        RecordSchema::new("address", vec![Field::of("city", Schema::String)]).unwrap(),
    );
    let outer_schema = Arc::new(
        RecordSchema::new(
            "person",
            vec![Field::of(
                "address",
                Schema::Record(inner_schema.as_ref().clone()),
            )],
        )
        .unwrap(),
    );

    let inner = StructuredRecord::builder(inner_schema)
        .set("city", "Oslo")
        .build()
        .unwrap();
    let outer = StructuredRecord::builder(outer_schema)
        .set("address", inner)
        .build()
        .unwrap();

    match outer.get("address") {
        Some(Value::Record(nested)) => {
            assert_eq!(nested.get("city"), Some(&Value::String("Oslo".into())));
        }
        other => panic!("expected nested record, got {other:?}"),
    }
}
