//! Error types for geohasher

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeohasherError {
    // Codec errors
    #[error("Invalid geohash precision {precision}: expected a value between 1 and 12")]
    InvalidPrecision { precision: usize },

    #[error("Invalid coordinate ({lon}, {lat}): {reason}")]
    InvalidCoordinate { lon: f64, lat: f64, reason: String },

    #[error("Invalid geohash cell '{cell}': {reason}")]
    InvalidCell { cell: String, reason: String },

    // Coverage errors
    #[error("Invalid polygon{}: {reason}", feature_clause(" at feature", .feature_id))]
    InvalidPolygon { feature_id: String, reason: String },

    #[error(
        "Coverage{} visited more than {limit} cells. Lower the precision or raise max_cells",
        feature_clause(" of feature", .feature_id)
    )]
    ResourceLimitExceeded { feature_id: String, limit: usize },

    #[error("Coverage cancelled")]
    Cancelled,

    // Output errors
    #[error("Failed to write output to {path}: {reason}")]
    SinkWrite { path: PathBuf, reason: String },

    // Format errors
    #[error("Unsupported format: .{extension}. Supported: {}", .supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error(
        "Unsupported geometry type {geometry_type}{}: only Polygon and MultiPolygon can be covered",
        feature_clause(" at feature", .feature_id)
    )]
    UnsupportedGeometry {
        feature_id: String,
        geometry_type: String,
    },

    #[error("Invalid {format} file: {reason}")]
    FormatValidation { format: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`GeohasherError`], reported next to the message in batch summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPrecision,
    InvalidCoordinate,
    InvalidCell,
    InvalidPolygon,
    ResourceLimitExceeded,
    Cancelled,
    SinkWrite,
    UnsupportedFormat,
    UnsupportedGeometry,
    FormatValidation,
    Config,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidPrecision => "InvalidPrecision",
            ErrorKind::InvalidCoordinate => "InvalidCoordinate",
            ErrorKind::InvalidCell => "InvalidCell",
            ErrorKind::InvalidPolygon => "InvalidPolygon",
            ErrorKind::ResourceLimitExceeded => "ResourceLimitExceeded",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::SinkWrite => "SinkWrite",
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::UnsupportedGeometry => "UnsupportedGeometry",
            ErrorKind::FormatValidation => "FormatValidation",
            ErrorKind::Config => "Config",
            ErrorKind::Io => "Io",
        };
        f.write_str(name)
    }
}

impl GeohasherError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeohasherError::InvalidPrecision { .. } => ErrorKind::InvalidPrecision,
            GeohasherError::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            GeohasherError::InvalidCell { .. } => ErrorKind::InvalidCell,
            GeohasherError::InvalidPolygon { .. } => ErrorKind::InvalidPolygon,
            GeohasherError::ResourceLimitExceeded { .. } => ErrorKind::ResourceLimitExceeded,
            GeohasherError::Cancelled => ErrorKind::Cancelled,
            GeohasherError::SinkWrite { .. } => ErrorKind::SinkWrite,
            GeohasherError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            GeohasherError::UnsupportedGeometry { .. } => ErrorKind::UnsupportedGeometry,
            GeohasherError::FormatValidation { .. } => ErrorKind::FormatValidation,
            GeohasherError::ConfigInvalid { .. } => ErrorKind::Config,
            GeohasherError::Io(_) => ErrorKind::Io,
        }
    }

    /// Attach a feature id to errors that carry one.
    ///
    /// The coverage engine does not know which feature it is working on, so it
    /// reports an empty id and the batch layer fills it in.
    pub fn with_feature_id(self, id: impl Into<String>) -> Self {
        match self {
            GeohasherError::InvalidPolygon { reason, .. } => {
                GeohasherError::InvalidPolygon { feature_id: id.into(), reason }
            }
            GeohasherError::ResourceLimitExceeded { limit, .. } => {
                GeohasherError::ResourceLimitExceeded { feature_id: id.into(), limit }
            }
            GeohasherError::UnsupportedGeometry { geometry_type, .. } => {
                GeohasherError::UnsupportedGeometry { feature_id: id.into(), geometry_type }
            }
            other => other,
        }
    }
}

/// Names the feature in a message, or nothing when the id is not known yet
fn feature_clause(prefix: &str, feature_id: &str) -> String {
    if feature_id.is_empty() {
        String::new()
    } else {
        format!("{prefix} {feature_id}")
    }
}

pub type Result<T> = std::result::Result<T, GeohasherError>;
