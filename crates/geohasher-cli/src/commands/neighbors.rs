//! Neighbors command implementation

use crate::cli::NeighborsArgs;
use crate::output::OutputWriter;
use crate::output_types::{NeighborItem, NeighborsOutput};
use anyhow::Result;
use geohasher_geo::geohash::{neighbor, normalize};
use geohasher_geo::Direction;
use std::process::ExitCode;
use tabled::Tabled;

pub fn execute(args: NeighborsArgs, output: &OutputWriter) -> Result<ExitCode> {
    let geohash = normalize(&args.cell)?;

    let mut items = Vec::with_capacity(Direction::ALL.len());
    for direction in Direction::ALL {
        items.push(NeighborItem {
            direction: direction.as_str().to_string(),
            geohash: neighbor(&geohash, direction)?,
        });
    }

    if output.is_json() {
        output.result(NeighborsOutput { geohash, neighbors: items })?;
    } else {
        #[derive(Tabled)]
        struct NeighborRow {
            #[tabled(rename = "Direction")]
            direction: String,
            #[tabled(rename = "Geohash")]
            geohash: String,
        }

        output.section(format!("Neighbors of {}", geohash));
        let rows: Vec<NeighborRow> = items
            .into_iter()
            .map(|item| NeighborRow {
                direction: item.direction,
                geohash: item.geohash.unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        output.table(rows);
    }

    Ok(ExitCode::SUCCESS)
}
