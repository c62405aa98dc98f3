use crate::error::{GeohasherError, Result};
use crate::models::CoveragePolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default geohash precision offered to users (roughly 150m cells)
pub const DEFAULT_PRECISION: usize = 7;

/// Default cap on cells visited by one coverage computation
pub const DEFAULT_MAX_CELLS: usize = 1_000_000;

/// Valid geohash precisions
pub const PRECISION_RANGE: std::ops::RangeInclusive<usize> = 1..=12;

/// Configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "geohasher.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geohasher
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub precision: ConfigValue<usize>,
    pub policy: ConfigValue<CoveragePolicy>,
    pub max_cells: ConfigValue<usize>,
    pub dedup: ConfigValue<bool>,
    pub stop_on_error: ConfigValue<bool>,
    pub parallel: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            precision: ConfigValue::new(DEFAULT_PRECISION, ConfigSource::Default),
            policy: ConfigValue::new(CoveragePolicy::Intersects, ConfigSource::Default),
            max_cells: ConfigValue::new(DEFAULT_MAX_CELLS, ConfigSource::Default),
            dedup: ConfigValue::new(false, ConfigSource::Default),
            stop_on_error: ConfigValue::new(false, ConfigSource::Default),
            parallel: ConfigValue::new(true, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeohasherError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeohasherError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(precision) = file_config.precision {
            self.precision.update(validate_precision(precision)?, ConfigSource::File);
        }

        if let Some(policy) = file_config.policy {
            self.policy.update(parse_policy(&policy)?, ConfigSource::File);
        }

        if let Some(max_cells) = file_config.max_cells {
            self.max_cells.update(validate_max_cells(max_cells)?, ConfigSource::File);
        }

        if let Some(dedup) = file_config.dedup {
            self.dedup.update(dedup, ConfigSource::File);
        }

        if let Some(stop_on_error) = file_config.stop_on_error {
            self.stop_on_error.update(stop_on_error, ConfigSource::File);
        }

        if let Some(parallel) = file_config.parallel {
            self.parallel.update(parallel, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the file only when it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No config file at {}", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOHASHER_PRECISION
        if let Ok(precision_str) = env::var("GEOHASHER_PRECISION") {
            match parse_precision(&precision_str) {
                Ok(precision) => self.precision.update(precision, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOHASHER_PRECISION value '{}': expected integer between 1 and 12",
                    precision_str
                ),
            }
        }

        // GEOHASHER_POLICY
        if let Ok(policy_str) = env::var("GEOHASHER_POLICY") {
            match parse_policy(&policy_str) {
                Ok(policy) => self.policy.update(policy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOHASHER_POLICY value '{}': \
                     expected intersects, contains_center or fully_contained",
                    policy_str
                ),
            }
        }

        // GEOHASHER_MAX_CELLS
        if let Ok(max_cells_str) = env::var("GEOHASHER_MAX_CELLS") {
            match max_cells_str.parse::<usize>().ok().filter(|n| *n > 0) {
                Some(max_cells) => self.max_cells.update(max_cells, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid GEOHASHER_MAX_CELLS value '{}': expected positive integer",
                    max_cells_str
                ),
            }
        }

        for (var, target) in [
            ("GEOHASHER_DEDUP", &mut self.dedup),
            ("GEOHASHER_STOP_ON_ERROR", &mut self.stop_on_error),
            ("GEOHASHER_PARALLEL", &mut self.parallel),
        ] {
            if let Ok(flag_str) = env::var(var) {
                match parse_bool(&flag_str) {
                    Ok(flag) => target.update(flag, ConfigSource::Environment),
                    Err(_) => tracing::warn!(
                        "Invalid {} value '{}': expected true or false",
                        var,
                        flag_str
                    ),
                }
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        if let Some(precision) = overrides.precision {
            self.precision.update(validate_precision(precision)?, ConfigSource::Cli);
        }

        if let Some(policy) = overrides.policy {
            self.policy.update(policy, ConfigSource::Cli);
        }

        if let Some(max_cells) = overrides.max_cells {
            self.max_cells.update(validate_max_cells(max_cells)?, ConfigSource::Cli);
        }

        if let Some(dedup) = overrides.dedup {
            self.dedup.update(dedup, ConfigSource::Cli);
        }

        if let Some(stop_on_error) = overrides.stop_on_error {
            self.stop_on_error.update(stop_on_error, ConfigSource::Cli);
        }

        if let Some(parallel) = overrides.parallel {
            self.parallel.update(parallel, ConfigSource::Cli);
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "precision".to_string(),
            (self.precision.value.to_string(), self.precision.source),
        );

        map.insert("policy".to_string(), (self.policy.value.to_string(), self.policy.source));

        map.insert(
            "max_cells".to_string(),
            (self.max_cells.value.to_string(), self.max_cells.source),
        );

        map.insert("dedup".to_string(), (self.dedup.value.to_string(), self.dedup.source));

        map.insert(
            "stop_on_error".to_string(),
            (self.stop_on_error.value.to_string(), self.stop_on_error.source),
        );

        map.insert(
            "parallel".to_string(),
            (self.parallel.value.to_string(), self.parallel.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    precision: Option<usize>,
    policy: Option<String>,
    max_cells: Option<usize>,
    dedup: Option<bool>,
    stop_on_error: Option<bool>,
    parallel: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub precision: Option<usize>,
    pub policy: Option<CoveragePolicy>,
    pub max_cells: Option<usize>,
    pub dedup: Option<bool>,
    pub stop_on_error: Option<bool>,
    pub parallel: Option<bool>,
}

/// Check that a precision lies in the supported range
pub fn validate_precision(precision: usize) -> Result<usize> {
    if PRECISION_RANGE.contains(&precision) {
        Ok(precision)
    } else {
        Err(GeohasherError::ConfigInvalid {
            key: "precision".to_string(),
            reason: format!("Precision {} is outside 1..=12", precision),
        })
    }
}

fn validate_max_cells(max_cells: usize) -> Result<usize> {
    if max_cells == 0 {
        return Err(GeohasherError::ConfigInvalid {
            key: "max_cells".to_string(),
            reason: "max_cells must be greater than zero".to_string(),
        });
    }
    Ok(max_cells)
}

/// Parse precision from string
pub fn parse_precision(s: &str) -> Result<usize> {
    let precision = s.trim().parse::<usize>().map_err(|_| GeohasherError::ConfigInvalid {
        key: "precision".to_string(),
        reason: format!("Invalid precision: {}. Use an integer between 1 and 12", s),
    })?;
    validate_precision(precision)
}

/// Parse coverage policy from string
pub fn parse_policy(s: &str) -> Result<CoveragePolicy> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "intersects" | "intersect" | "any" => Ok(CoveragePolicy::Intersects),
        "contains_center" | "center" => Ok(CoveragePolicy::ContainsCenter),
        "fully_contained" | "contained" | "inner" => Ok(CoveragePolicy::FullyContained),
        _ => Err(GeohasherError::ConfigInvalid {
            key: "policy".to_string(),
            reason: format!(
                "Invalid policy: {}. Use intersects, contains_center, or fully_contained",
                s
            ),
        }),
    }
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(GeohasherError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}", s),
        }),
    }
}
