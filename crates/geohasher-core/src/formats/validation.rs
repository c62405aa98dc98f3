use crate::error::{GeohasherError, Result};
use crate::formats::FormatValidation;
use std::path::Path;

/// Size above which a layer file triggers a slow-processing warning
const LARGE_FILE_MB: u64 = 100;

pub struct FormatValidator;

impl FormatValidator {
    /// Validate that a file exists and is readable
    pub fn validate_file_exists(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        if !path.exists() {
            validation.errors.push(format!("File not found: {}", path.display()));
            return validation;
        }
        if !path.is_file() {
            validation.errors.push(format!("Not a regular file: {}", path.display()));
            return validation;
        }
        if let Err(e) = std::fs::metadata(path) {
            validation.errors.push(format!("Cannot access file: {}", e));
        }

        validation
    }

    /// Warn about layers large enough to take a while
    pub fn validate_file_size(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::metadata(path) {
            Ok(metadata) => {
                let size_mb = metadata.len() / (1024 * 1024);
                if size_mb > LARGE_FILE_MB {
                    validation.warnings.push(format!(
                        "Very large file ({} MB) may take significant time to process",
                        size_mb
                    ));
                }
            }
            Err(e) => {
                validation.errors.push(format!("Cannot read file metadata: {}", e));
            }
        }

        validation
    }

    /// Validate JSON structure by attempting to parse
    pub fn validate_json_structure(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                    validation.errors.push(format!("Invalid JSON structure: {}", e));
                }
            }
            Err(e) => {
                validation.errors.push(format!("Cannot read file: {}", e));
            }
        }

        validation
    }

    /// Merge multiple validation results
    pub fn merge_validations(validations: Vec<FormatValidation>) -> FormatValidation {
        let mut merged = FormatValidation::default();

        for validation in validations {
            merged.errors.extend(validation.errors);
            merged.warnings.extend(validation.warnings);
        }

        merged
    }

    /// Convert a validation result to a Result type
    pub fn validation_to_result(validation: &FormatValidation, format_name: &str) -> Result<()> {
        if !validation.is_valid() {
            Err(GeohasherError::FormatValidation {
                format: format_name.to_string(),
                reason: validation.errors.join("; "),
            })
        } else {
            Ok(())
        }
    }
}
