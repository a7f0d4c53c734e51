//! Command-line interface
//!
//! Subcommand handlers for the `openapi-ingest` binary.

pub mod commands;
pub mod error;

pub use error::CliError;
