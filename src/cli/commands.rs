//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lakesink CLI
#[derive(Parser, Debug)]
#[command(name = "lakesink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcode JSONL records against an input schema and write the
    /// configured output format
    Run {
        /// Sink configuration file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Input schema file (JSON schema description)
        #[arg(short, long)]
        schema: PathBuf,

        /// Input records file (JSONL, one record per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (overrides the configured path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configured output schema against an input schema
    Validate {
        /// Sink configuration file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Input schema file (JSON schema description)
        #[arg(short, long)]
        schema: PathBuf,
    },
}
