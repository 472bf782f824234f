//! CLI runner - executes commands

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::commands::{Cli, Commands};
use crate::config::SinkConfig;
use crate::decode::records_from_jsonl;
use crate::error::{Error, Result, ResultExt};
use crate::output::{write_batches_to_parquet, AvroFileWriter, TextFileWriter};
use crate::schema::RecordSchema;
use crate::sink::{RecordSink, SinkValue};
use crate::transcode;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                config,
                schema,
                input,
                output,
            } => self.run_job(config, schema, input, output.as_deref()),
            Commands::Validate { config, schema } => self.validate(config, schema),
        }
    }

    fn run_job(
        &self,
        config_path: &Path,
        schema_path: &Path,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<()> {
        let config = load_config(config_path)?;
        let input_schema = Arc::new(load_schema(schema_path)?);
        let mut sink = RecordSink::configure(&config, Some(input_schema.as_ref()))?;

        let text = read_file(input_path)?;
        let records = records_from_jsonl(&input_schema, &text)?;
        info!(records = records.len(), "decoded input records");

        if records.is_empty() {
            warn!("no input records; nothing to write");
            return Ok(());
        }

        let output_path: PathBuf =
            output_path.map_or_else(|| PathBuf::from(&config.path), Path::to_path_buf);

        let mut pairs = Vec::with_capacity(records.len());
        for record in &records {
            pairs.push(sink.transform(record)?);
        }

        let rows = write_pairs(&output_path, pairs)?;
        info!(rows, path = %output_path.display(), "sink job finished");
        Ok(())
    }

    fn validate(&self, config_path: &Path, schema_path: &Path) -> Result<()> {
        let config = load_config(config_path)?;
        let input_schema = load_schema(schema_path)?;

        let Some(output) = config.output_schema()? else {
            println!(
                "No output schema declared; the input record schema will be used as-is."
            );
            return config.validate();
        };

        let violations = transcode::check(&output, &input_schema, config.output_format);
        if violations.is_empty() {
            println!("Output schema is a valid projection of the input schema.");
            return Ok(());
        }

        for violation in &violations {
            eprintln!("  {violation}");
        }
        Err(Error::config(format!(
            "output schema has {} violation(s)",
            violations.len()
        )))
    }
}

fn load_config(path: &Path) -> Result<SinkConfig> {
    SinkConfig::from_yaml(&read_file(path)?)
        .with_context(|| format!("loading sink config from {}", path.display()))
}

fn load_schema(path: &Path) -> Result<RecordSchema> {
    RecordSchema::parse_json(&read_file(path)?)
        .with_context(|| format!("loading input schema from {}", path.display()))
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

/// Hand the transcoded pairs to the writer matching whichever slot is
/// populated.
fn write_pairs(path: &Path, pairs: Vec<crate::sink::KeyValue>) -> Result<usize> {
    let mut columnar = Vec::new();
    let mut batches = Vec::new();
    let mut lines = Vec::new();

    for pair in pairs {
        match (pair.key, pair.value) {
            (SinkValue::Columnar(record), _) => columnar.push(record),
            (_, SinkValue::Row(batch)) => batches.push(batch),
            (SinkValue::Text(line), _) => lines.push(line),
            (key, value) => {
                return Err(Error::output(format!(
                    "unexpected output pair: ({key:?}, {value:?})"
                )))
            }
        }
    }

    if !columnar.is_empty() {
        let schema = Arc::clone(columnar[0].schema_handle());
        let mut writer = AvroFileWriter::new(path, &schema)?;
        for record in columnar {
            writer.write(record.into_parts().1)?;
        }
        return writer.close();
    }

    if !batches.is_empty() {
        return write_batches_to_parquet(path, &batches, None);
    }

    let mut writer = TextFileWriter::new(path)?;
    for line in &lines {
        writer.write_line(line)?;
    }
    writer.close()
}
