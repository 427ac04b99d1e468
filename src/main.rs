//! MediaHub command-line entry point.
//!
//! Loads configuration, initialises logging, and hands off to the command
//! tree in `mediahub-cli`.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use mediahub_cli::{Cli, output};
use mediahub_core::config::{AppConfig, LogFormat};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match mediahub_cli::commands::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::debug!(config = %cli.config, "Configuration loaded");

    if let Err(e) = cli.execute(&config).await {
        tracing::debug!(code = e.code(), error = %e, "Command failed");
        output::print_error(&format!("{} ({})", e.message, e.code()));
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
