//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use geohasher_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use geohasher_core::models::CoveragePolicy;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: [&str; 6] = [
    "GEOHASHER_PRECISION",
    "GEOHASHER_POLICY",
    "GEOHASHER_MAX_CELLS",
    "GEOHASHER_DEDUP",
    "GEOHASHER_STOP_ON_ERROR",
    "GEOHASHER_PARALLEL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
precision = 4
# Only override precision
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.precision.value, 4);
    assert_eq!(config.precision.source, ConfigSource::File);
    assert_eq!(config.policy.value, CoveragePolicy::Intersects);
    assert_eq!(config.policy.source, ConfigSource::Default);
    assert_eq!(config.max_cells.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("GEOHASHER_PRECISION", "9");
    env::set_var("GEOHASHER_POLICY", "contains-center");
    env::set_var("GEOHASHER_DEDUP", "yes");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
precision = 5
policy = "fully_contained"
dedup = false
parallel = false
"#
    )
    .unwrap();

    let config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.precision.value, 9);
    assert_eq!(config.precision.source, ConfigSource::Environment);
    assert_eq!(config.policy.value, CoveragePolicy::ContainsCenter);
    assert!(config.dedup.value);
    // Not set in the environment, file value stays
    assert!(!config.parallel.value);
    assert_eq!(config.parallel.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("GEOHASHER_PRECISION", "13");
    env::set_var("GEOHASHER_MAX_CELLS", "0");
    env::set_var("GEOHASHER_PARALLEL", "sometimes");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.precision.value, 7);
    assert_eq!(config.precision.source, ConfigSource::Default);
    assert_eq!(config.max_cells.value, 1_000_000);
    assert!(config.parallel.value);

    clear_env();
}

#[test]
#[serial]
fn test_configuration_precedence_order() {
    clear_env();
    env::set_var("GEOHASHER_MAX_CELLS", "2000");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_cells = 500").unwrap();

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.max_cells.value, 2000);
    assert_eq!(config.max_cells.source, ConfigSource::Environment);

    config
        .update_from_cli(CliConfigOverrides { max_cells: Some(10), ..Default::default() })
        .unwrap();

    assert_eq!(config.max_cells.value, 10);
    assert_eq!(config.max_cells.source, ConfigSource::Cli);

    assert!(ConfigSource::Cli.precedence() > ConfigSource::Environment.precedence());
    assert!(ConfigSource::Environment.precedence() > ConfigSource::File.precedence());
    assert!(ConfigSource::File.precedence() > ConfigSource::Default.precedence());

    clear_env();
}

#[test]
fn test_configuration_source_tracking() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "precision = 3\nstop_on_error = true").unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();
    let inspection_map = config.to_inspection_map();

    for key in ["precision", "policy", "max_cells", "dedup", "stop_on_error", "parallel"] {
        assert!(inspection_map.contains_key(key), "missing {}", key);
    }

    let (precision_value, precision_source) = &inspection_map["precision"];
    assert_eq!(precision_value, "3");
    assert_eq!(*precision_source, ConfigSource::File);

    let (stop_value, _) = &inspection_map["stop_on_error"];
    assert_eq!(stop_value, "true");
}

#[test]
fn test_invalid_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invalid toml content [[[").unwrap();

    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err());
}

#[test]
fn test_invalid_policy_in_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "policy = \"touches\"").unwrap();

    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err());
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let non_existent = temp_dir.path().join("does_not_exist.toml");

    assert!(LayeredConfig::with_defaults().load_from_file(&non_existent).is_err());
    assert!(LayeredConfig::with_defaults().load_from_optional_file(&non_existent).is_ok());
}

#[test]
#[serial]
fn test_full_configuration_workflow() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("geohasher.toml");
    fs::write(
        &config_path,
        r#"
precision = 6
policy = "fully_contained"
stop_on_error = true
"#,
    )
    .unwrap();

    env::set_var("GEOHASHER_POLICY", "intersects");

    let mut config = LayeredConfig::with_defaults()
        .load_from_optional_file(&config_path)
        .unwrap()
        .load_from_env();

    assert_eq!(config.precision.value, 6);
    assert_eq!(config.policy.value, CoveragePolicy::Intersects);
    assert_eq!(config.policy.source, ConfigSource::Environment);
    assert!(config.stop_on_error.value);

    config
        .update_from_cli(CliConfigOverrides {
            precision: Some(8),
            stop_on_error: Some(false),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(config.precision.value, 8);
    assert_eq!(config.precision.source, ConfigSource::Cli);
    assert!(!config.stop_on_error.value);
    assert_eq!(config.policy.source, ConfigSource::Environment);

    clear_env();
}
