use clap::{Parser, Subcommand};
use geohasher_core::models::CoveragePolicy;
use std::path::PathBuf;

/// Geohasher - Cover polygon layers with geohash cells
#[derive(Parser, Debug)]
#[command(name = "geohasher")]
#[command(about = "Cover polygon layers with geohash cells", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./geohasher.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cover every polygon of a layer and write one CSV row per cell
    Cover(CoverArgs),

    /// Encode a longitude/latitude pair
    Encode(EncodeArgs),

    /// Decode a geohash into its bounding box
    Decode(DecodeArgs),

    /// List the neighbours of a geohash
    Neighbors(NeighborsArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct CoverArgs {
    /// Input layer (GeoJSON)
    pub input: PathBuf,

    /// Output CSV file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Geohash precision (1-12)
    #[arg(long, short = 'p')]
    pub precision: Option<usize>,

    /// Coverage policy (intersects, contains_center, fully_contained)
    #[arg(long, value_parser = parse_policy_arg)]
    pub policy: Option<CoveragePolicy>,

    /// Maximum cells visited per feature
    #[arg(long)]
    pub max_cells: Option<usize>,

    /// Keep each cell only for the first feature that covers it
    #[arg(long)]
    pub dedup: bool,

    /// Abort the remaining features after the first failure
    #[arg(long)]
    pub stop_on_error: bool,

    /// Process features one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Interactive mode - prompt for precision and output path
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Geohash precision (1-12)
    #[arg(long, short = 'p')]
    pub precision: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Geohash cell
    pub cell: String,
}

#[derive(Parser, Debug)]
pub struct NeighborsArgs {
    /// Geohash cell
    pub cell: String,
}

fn parse_policy_arg(s: &str) -> Result<CoveragePolicy, String> {
    geohasher_core::config::parse_policy(s).map_err(|e| e.to_string())
}
