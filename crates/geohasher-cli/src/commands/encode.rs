//! Encode command implementation

use crate::cli::EncodeArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::EncodeOutput;
use anyhow::Result;
use geohasher_core::config::CliConfigOverrides;
use geohasher_core::models::GeoPoint;
use geohasher_geo::encode;
use std::path::Path;
use std::process::ExitCode;

pub fn execute(
    args: EncodeArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let precision = match args.precision {
        // An explicit precision is checked by the codec itself
        Some(precision) => precision,
        None => {
            load_config_with_overrides(config_path, CliConfigOverrides::default())?.precision.value
        }
    };

    let geohash = encode(GeoPoint::new(args.lon, args.lat), precision)?;

    if output.is_json() {
        output.result(EncodeOutput { lon: args.lon, lat: args.lat, precision, geohash })?;
    } else {
        println!("{}", geohash);
    }

    Ok(ExitCode::SUCCESS)
}
