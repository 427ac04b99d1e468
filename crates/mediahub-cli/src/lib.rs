//! MediaHub command-line interface.
//!
//! A clap command tree that loads configuration, wires the configured store
//! and asset host into the services, and prints results as tables or JSON.

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands, Services};
pub use output::OutputFormat;
