use geohasher_core::models::CoveragePolicy;
use geohasher_pipeline::{BatchSummary, FeatureFailure};
use serde::Serialize;

/// Output for cover command
#[derive(Debug, Serialize)]
pub struct CoverOutput {
    pub input: String,
    pub output: Option<String>,
    pub precision: usize,
    pub policy: CoveragePolicy,
    pub rows_written: usize,
    pub summary: BatchSummary,
    pub failures: Vec<FeatureFailure>,
}

/// Output for encode command
#[derive(Debug, Serialize)]
pub struct EncodeOutput {
    pub lon: f64,
    pub lat: f64,
    pub precision: usize,
    pub geohash: String,
}

/// Output for decode command
#[derive(Debug, Serialize)]
pub struct DecodeOutput {
    pub geohash: String,
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub center: [f64; 2],
}

/// Output for neighbors command
#[derive(Debug, Serialize)]
pub struct NeighborsOutput {
    pub geohash: String,
    pub neighbors: Vec<NeighborItem>,
}

#[derive(Debug, Serialize)]
pub struct NeighborItem {
    pub direction: String,
    /// None past a pole
    pub geohash: Option<String>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub precision: ConfigEntry,
    pub policy: ConfigEntry,
    pub max_cells: ConfigEntry,
    pub dedup: ConfigEntry,
    pub stop_on_error: ConfigEntry,
    pub parallel: ConfigEntry,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
