//! Layer readers
//!
//! Each input format implements the `FormatReader` trait, and the `FormatRegistry`
//! picks a reader from the file extension.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{GeohasherError, Result};
use crate::models::Layer;

pub mod geojson;
pub mod validation;

/// Format reader trait that all format implementations must implement
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Read a layer from the given path
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// A `Layer` with its field list and polygon features
    async fn read(&self, path: &Path) -> Result<Layer>;

    /// Get supported file extensions (e.g., ["geojson", "json"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without full read (optional)
    async fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every built-in reader
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(geojson::GeoJsonReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            GeohasherError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            }
        })?;
        let extension = extension.to_lowercase();

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| GeohasherError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Validate and read a layer with the matching reader
    pub async fn read_layer(&self, path: &Path) -> Result<Layer> {
        let reader = self.detect_format(path)?;

        let validation = reader.validate(path).await?;
        for warning in &validation.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        validation::FormatValidator::validation_to_result(&validation, reader.format_name())?;

        let layer = reader.read(path).await?;
        tracing::info!(
            "Read {} features with {} fields from {} ({})",
            layer.features.len(),
            layer.fields.len(),
            path.display(),
            reader.format_name()
        );
        Ok(layer)
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn FormatReader>] {
        &self.readers
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
