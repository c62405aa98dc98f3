//! Config command implementation

use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use geohasher_core::config::{ConfigSource, ConfigValue};
use std::fmt::Display;
use std::path::Path;
use std::process::ExitCode;
use tabled::Tabled;

pub fn execute(output: &OutputWriter, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;

    let report = ConfigOutput {
        precision: entry(&config.precision),
        policy: entry(&config.policy),
        max_cells: entry(&config.max_cells),
        dedup: entry(&config.dedup),
        stop_on_error: entry(&config.stop_on_error),
        parallel: entry(&config.parallel),
    };

    if output.is_json() {
        output.result(report)?;
        return Ok(ExitCode::SUCCESS);
    }

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: &'static str,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<ConfigRow> = [
        ("precision", report.precision),
        ("policy", report.policy),
        ("max_cells", report.max_cells),
        ("dedup", report.dedup),
        ("stop_on_error", report.stop_on_error),
        ("parallel", report.parallel),
    ]
    .into_iter()
    .map(|(key, entry)| ConfigRow { key, value: entry.value, source: entry.source })
    .collect();

    output.section("Effective Configuration");
    output.table(rows);

    Ok(ExitCode::SUCCESS)
}

fn entry<T: Display>(value: &ConfigValue<T>) -> ConfigEntry {
    ConfigEntry { value: value.value.to_string(), source: source_name(value.source).to_string() }
}

fn source_name(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "file",
        ConfigSource::Environment => "environment",
        ConfigSource::Cli => "cli",
    }
}
