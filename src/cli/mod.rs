//! CLI module
//!
//! Command-line interface for running sink jobs.
//!
//! # Commands
//!
//! - `run` - Transcode JSONL records and write an output file
//! - `validate` - Check the configured output schema against an input schema

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
