//! Geohasher CLI - Command-line interface
//!
//! Covers polygon layers with geohash cells and exposes the codec helpers.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod interactive;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime and execute the command
    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    match result {
        Ok(code) => code,
        Err(err) => {
            errors::from_anyhow(err).display();
            ExitCode::FAILURE
        }
    }
}
