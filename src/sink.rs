//! Sink harness seam
//!
//! One [`RecordSink`] is created per parallel execution task and invoked
//! synchronously, once per input record, by the external batch driver. The
//! sink owns its transformer (and thus its schema cache); nothing is
//! shared across tasks.

use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::config::SinkConfig;
use crate::error::Result;
use crate::record::StructuredRecord;
use crate::schema::RecordSchema;
use crate::transcode::{
    ColumnarRecord, ColumnarTransformer, RowTransformer, TextTransformer, Transform,
};
use crate::types::OutputFormat;

/// One transcoded output value
#[derive(Debug)]
pub enum SinkValue {
    /// Nothing on this side of the pair
    Null,
    /// A self-describing columnar record
    Columnar(ColumnarRecord),
    /// A typed one-row batch
    Row(RecordBatch),
    /// A delimited text line
    Text(String),
}

/// The (key, value) pair handed to the external writer for one record.
///
/// Columnar and text output ride the key slot, row output the value slot,
/// mirroring where each output format expects its payload.
#[derive(Debug)]
pub struct KeyValue {
    /// Key side of the pair
    pub key: SinkValue,
    /// Value side of the pair
    pub value: SinkValue,
}

enum Transcoder {
    Columnar(ColumnarTransformer),
    Row(RowTransformer),
    Text(TextTransformer),
}

/// A configured sink: transforms structured records into output pairs
pub struct RecordSink {
    transcoder: Transcoder,
}

impl RecordSink {
    /// Build a sink from configuration.
    ///
    /// When the declared input schema is known, the projection validator
    /// runs here, once, so an incompatible output schema fails the job
    /// before any record flows.
    pub fn configure(config: &SinkConfig, input_schema: Option<&RecordSchema>) -> Result<Self> {
        match input_schema {
            Some(input) => config.validate_against(input)?,
            None => config.validate()?,
        }

        let output_schema = config.output_schema()?;
        let transcoder = match config.output_format {
            OutputFormat::Columnar => {
                Transcoder::Columnar(ColumnarTransformer::new(output_schema))
            }
            OutputFormat::Row => Transcoder::Row(RowTransformer::new(output_schema)),
            OutputFormat::Text => Transcoder::Text(TextTransformer::new(
                config.field_delimiter(),
                output_schema,
            )),
        };

        info!(
            reference_name = %config.reference_name,
            format = %config.output_format,
            "sink configured"
        );
        Ok(Self { transcoder })
    }

    /// Transcode one record into its (key, value) output pair
    pub fn transform(&mut self, record: &StructuredRecord) -> Result<KeyValue> {
        match &mut self.transcoder {
            Transcoder::Columnar(transformer) => Ok(KeyValue {
                key: SinkValue::Columnar(transformer.transform(record)?),
                value: SinkValue::Null,
            }),
            Transcoder::Row(transformer) => Ok(KeyValue {
                key: SinkValue::Null,
                value: SinkValue::Row(transformer.transform(record)?),
            }),
            Transcoder::Text(transformer) => Ok(KeyValue {
                key: SinkValue::Text(transformer.transform(record)?),
                value: SinkValue::Null,
            }),
        }
    }
}
