//! File writers for transcoded output

use apache_avro::types::Value as GenericValue;
use apache_avro::Schema as AvroSchema;
use arrow::datatypes::Schema as ArrowSchema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Configuration for the Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer for row-format batches
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &ArrowSchema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;

        let props = config.build_properties();
        let writer =
            ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props)).map_err(|e| {
                Error::Output {
                    message: format!("Failed to create Parquet writer: {e}"),
                }
            })?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a batch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// Write row batches to a Parquet file
pub fn write_batches_to_parquet(
    path: impl AsRef<Path>,
    batches: &[RecordBatch],
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    if batches.is_empty() {
        return Err(Error::output("No batches to write"));
    }

    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::new(path, batches[0].schema().as_ref(), config)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()
}

/// Avro object container file writer for columnar records.
///
/// The schema is embedded in the file, so readers can decode it without
/// out-of-band coordination; the caller owns the schema for the writer's
/// lifetime.
pub struct AvroFileWriter<'a> {
    writer: apache_avro::Writer<'a, File>,
    rows_written: usize,
}

impl<'a> AvroFileWriter<'a> {
    /// Create a new container file writer for the given schema
    pub fn new(path: impl AsRef<Path>, schema: &'a AvroSchema) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;
        Ok(Self {
            writer: apache_avro::Writer::new(schema, file),
            rows_written: 0,
        })
    }

    /// Append one generic record
    pub fn write(&mut self, value: GenericValue) -> Result<()> {
        self.writer.append(value)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Close the writer, flushing the final block
    pub fn close(self) -> Result<usize> {
        self.writer.into_inner()?;
        Ok(self.rows_written)
    }
}

/// Line-oriented writer for text output
pub struct TextFileWriter {
    writer: BufWriter<File>,
    rows_written: usize,
}

impl TextFileWriter {
    /// Create a new text writer
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            rows_written: 0,
        })
    }

    /// Write one line
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Close the writer, flushing buffered lines
    pub fn close(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}
