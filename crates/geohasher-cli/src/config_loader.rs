//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use geohasher_core::config::{CliConfigOverrides, LayeredConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Load layered configuration: defaults, then the file, then the environment.
///
/// An explicit `--config` path must exist; the default `geohasher.toml` in the
/// working directory is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let config = match explicit {
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => LayeredConfig::with_defaults()
            .load_from_optional_file(default_config_path())
            .context("Failed to load configuration file")?,
    };

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    explicit: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(explicit)?;
    config.update_from_cli(overrides).context("Invalid command-line option")?;
    Ok(config)
}

/// `geohasher.toml` in the working directory
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}
