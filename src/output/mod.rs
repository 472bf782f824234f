//! Output writers
//!
//! The file-writing side of a sink job: Parquet for row batches, Avro
//! object container files for columnar records, plain lines for text.
//! The transcoding core never touches these; they consume the values the
//! sink hands back.

mod writer;

pub use writer::{
    write_batches_to_parquet, AvroFileWriter, ParquetWriter, ParquetWriterConfig, TextFileWriter,
};
