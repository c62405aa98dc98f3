//! Command implementations

mod config;
mod cover;
mod decode;
mod encode;
mod neighbors;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use std::process::ExitCode;

/// Execute a CLI command, returning the process exit code
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Cover(args) => cover::execute(args, &output, config_path, cli.dry_run).await,
        Commands::Encode(args) => encode::execute(args, &output, config_path),
        Commands::Decode(args) => decode::execute(args, &output),
        Commands::Neighbors(args) => neighbors::execute(args, &output),
        Commands::Config => config::execute(&output, config_path),
    }
}
