use console::style;
use geohasher_core::error::GeohasherError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing input layer
pub fn input_not_found(path: &str) -> CliError {
    CliError::new("Input layer not found")
        .with_context(format!("The specified input file does not exist.\n\nPath: {}", path))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use absolute path or path relative to current directory")
        .with_help("Run: geohasher cover --help")
}

/// Create error for an input format without a reader
pub fn unsupported_format(extension: &str, supported: &[String]) -> CliError {
    CliError::new(format!("Unsupported input format: .{}", extension))
        .with_context(format!("Supported formats: {}", supported.join(", ")))
        .with_suggestion(
            "Convert the layer to GeoJSON, for example: ogr2ogr -f GeoJSON out.geojson in.shp",
        )
        .with_help("Run: geohasher cover --help")
}

/// Create error for a precision outside 1..=12
pub fn invalid_precision(precision: usize) -> CliError {
    CliError::new(format!("Invalid precision: {}", precision))
        .with_context(
            "Geohash precision must be between 1 and 12.\n\n\
             Precision 7 gives cells of roughly 150m.",
        )
        .with_suggestion("Pass --precision with a value between 1 and 12")
        .with_suggestion("Or set GEOHASHER_PRECISION")
        .with_help("Run: geohasher config")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check geohasher.toml for syntax errors")
        .with_suggestion("Check the GEOHASHER_* environment variables")
        .with_help("Run: geohasher config")
}

/// Create error for a feature that hit the visit limit
pub fn resource_limit(feature_id: &str, limit: usize) -> CliError {
    CliError::new(format!("Feature {} needs more than {} cells", feature_id, limit))
        .with_context("The coverage of this feature was abandoned to bound memory use.")
        .with_suggestion("Lower the precision with --precision")
        .with_suggestion("Or raise the limit with --max-cells")
        .with_help("Run: geohasher cover --help")
}

/// Create error for an output file that cannot be written
pub fn output_not_writable(path: &str, reason: &str) -> CliError {
    CliError::new("Cannot write output")
        .with_context(format!("Path: {}\n\nError: {}", path, reason))
        .with_suggestion("Check that the output directory exists")
        .with_suggestion("Check file permissions")
}

/// Convert a library error into a CliError with suggestions
pub fn from_geohasher(error: &GeohasherError) -> CliError {
    match error {
        GeohasherError::InvalidPrecision { precision } => invalid_precision(*precision),
        GeohasherError::UnsupportedFormat { extension, supported } => {
            unsupported_format(extension, supported)
        }
        GeohasherError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        GeohasherError::ResourceLimitExceeded { feature_id, limit } => {
            resource_limit(feature_id, *limit)
        }
        GeohasherError::SinkWrite { path, reason } => {
            output_not_writable(&path.display().to_string(), reason)
        }
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return CliError {
            message: cli_error.message.clone(),
            context: cli_error.context.clone(),
            suggestions: cli_error.suggestions.clone(),
            help_command: cli_error.help_command.clone(),
        };
    }

    if let Some(geohasher_error) = error.chain().find_map(|e| e.downcast_ref::<GeohasherError>()) {
        let converted = from_geohasher(geohasher_error);
        // Keep the outer context message when there is one
        return if error.to_string() != geohasher_error.to_string() && converted.context.is_none() {
            converted.with_context(format!("Error: {:#}", error))
        } else {
            converted
        };
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or run with appropriate privileges")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_error_has_suggestions() {
        let err = from_geohasher(&GeohasherError::InvalidPrecision { precision: 13 });
        assert_eq!(err.message, "Invalid precision: 13");
        assert_eq!(err.suggestions.len(), 2);
    }

    #[test]
    fn test_from_anyhow_finds_library_error() {
        let err = anyhow::Error::from(GeohasherError::ConfigInvalid {
            key: "policy".to_string(),
            reason: "Invalid policy: most".to_string(),
        })
        .context("Failed to load configuration");

        let cli_error = from_anyhow(err);
        assert_eq!(cli_error.message, "Invalid configuration: policy");
    }

    #[test]
    fn test_from_anyhow_plain_message() {
        let cli_error = from_anyhow(anyhow::anyhow!("something odd"));
        assert_eq!(cli_error.message, "something odd");
        assert!(cli_error.suggestions.is_empty());
    }
}
