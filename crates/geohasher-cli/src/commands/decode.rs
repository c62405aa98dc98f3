//! Decode command implementation

use crate::cli::DecodeArgs;
use crate::output::OutputWriter;
use crate::output_types::DecodeOutput;
use anyhow::Result;
use geohasher_geo::geohash::normalize;
use geohasher_geo::decode;
use std::process::ExitCode;

pub fn execute(args: DecodeArgs, output: &OutputWriter) -> Result<ExitCode> {
    let geohash = normalize(&args.cell)?;
    let bounds = decode(&geohash)?;
    let center = bounds.center();

    if output.is_json() {
        output.result(DecodeOutput {
            geohash,
            min_lon: bounds.min_lon,
            min_lat: bounds.min_lat,
            max_lon: bounds.max_lon,
            max_lat: bounds.max_lat,
            center: [center.lon, center.lat],
        })?;
    } else {
        output.section(format!("Cell {}", geohash));
        output.kv("Longitude", format!("{} .. {}", bounds.min_lon, bounds.max_lon));
        output.kv("Latitude", format!("{} .. {}", bounds.min_lat, bounds.max_lat));
        output.kv("Center", format!("{}, {}", center.lon, center.lat));
        output.kv("Size", format!("{} x {} degrees", bounds.width(), bounds.height()));
    }

    Ok(ExitCode::SUCCESS)
}
