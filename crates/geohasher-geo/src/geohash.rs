//! Geohash codec
//!
//! A geohash interleaves longitude and latitude bisection bits, longitude
//! first, five bits per base32 character. Every function here is pure.

use geohasher_core::config::PRECISION_RANGE;
use geohasher_core::error::{GeohasherError, Result};
use geohasher_core::models::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};

/// Geohash base32 alphabet (no a, i, l, o)
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest supported geohash
pub const MAX_PRECISION: usize = 12;

/// Rectangle covered by a decoded cell
pub type CellBounds = BoundingBox;

/// One of the eight grid directions around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Clockwise from north
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Column and row step, east and north positive
    pub fn offset(&self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a precision lies in 1..=12
pub fn validate_precision(precision: usize) -> Result<()> {
    if PRECISION_RANGE.contains(&precision) {
        Ok(())
    } else {
        Err(GeohasherError::InvalidPrecision { precision })
    }
}

fn validate_point(point: &GeoPoint) -> Result<()> {
    if !point.lon.is_finite() || !point.lat.is_finite() {
        return Err(GeohasherError::InvalidCoordinate {
            lon: point.lon,
            lat: point.lat,
            reason: "coordinates must be finite".to_string(),
        });
    }
    if !point.is_valid() {
        return Err(GeohasherError::InvalidCoordinate {
            lon: point.lon,
            lat: point.lat,
            reason: "longitude must be within [-180, 180] and latitude within [-90, 90]"
                .to_string(),
        });
    }
    Ok(())
}

/// Encode a point as a geohash of the given precision
pub fn encode(point: GeoPoint, precision: usize) -> Result<String> {
    validate_precision(precision)?;
    validate_point(&point)?;

    let (mut lon_min, mut lon_max) = (-180.0_f64, 180.0_f64);
    let (mut lat_min, mut lat_max) = (-90.0_f64, 90.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0;
    let mut idx = 0usize;

    while hash.len() < precision {
        if even {
            let mid = (lon_min + lon_max) / 2.0;
            if point.lon >= mid {
                idx = idx * 2 + 1;
                lon_min = mid;
            } else {
                idx *= 2;
                lon_max = mid;
            }
        } else {
            let mid = (lat_min + lat_max) / 2.0;
            if point.lat >= mid {
                idx = idx * 2 + 1;
                lat_min = mid;
            } else {
                idx *= 2;
                lat_max = mid;
            }
        }
        even = !even;
        bits += 1;

        if bits == 5 {
            hash.push(BASE32[idx] as char);
            bits = 0;
            idx = 0;
        }
    }

    Ok(hash)
}

/// Base32 values of a cell's characters, case-insensitive
fn char_values(cell: &str) -> Result<Vec<usize>> {
    if cell.is_empty() {
        return Err(GeohasherError::InvalidCell {
            cell: cell.to_string(),
            reason: "geohash is empty".to_string(),
        });
    }

    let values = cell
        .chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            BASE32.iter().position(|&b| b as char == lower).ok_or_else(|| {
                GeohasherError::InvalidCell {
                    cell: cell.to_string(),
                    reason: format!("character '{}' is not in the geohash alphabet", c),
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() > MAX_PRECISION {
        return Err(GeohasherError::InvalidCell {
            cell: cell.to_string(),
            reason: format!("geohash is longer than {} characters", MAX_PRECISION),
        });
    }

    Ok(values)
}

/// Validate a cell and return it in canonical lowercase form
pub fn normalize(cell: &str) -> Result<String> {
    char_values(cell)?;
    Ok(cell.to_ascii_lowercase())
}

/// Decode a geohash into the rectangle it covers
pub fn decode(cell: &str) -> Result<CellBounds> {
    let values = char_values(cell)?;

    let (mut lon_min, mut lon_max) = (-180.0_f64, 180.0_f64);
    let (mut lat_min, mut lat_max) = (-90.0_f64, 90.0_f64);
    let mut even = true;

    for value in values {
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            if even {
                let mid = (lon_min + lon_max) / 2.0;
                if bit == 1 {
                    lon_min = mid;
                } else {
                    lon_max = mid;
                }
            } else {
                let mid = (lat_min + lat_max) / 2.0;
                if bit == 1 {
                    lat_min = mid;
                } else {
                    lat_max = mid;
                }
            }
            even = !even;
        }
    }

    Ok(CellBounds::new(lon_min, lat_min, lon_max, lat_max))
}

/// Centre point of a cell
pub fn decode_center(cell: &str) -> Result<GeoPoint> {
    Ok(decode(cell)?.center())
}

/// Width and height in degrees of every cell at a precision
pub fn cell_dimensions(precision: usize) -> Result<(f64, f64)> {
    validate_precision(precision)?;

    let total_bits = 5 * precision;
    let lon_bits = total_bits.div_ceil(2);
    let lat_bits = total_bits / 2;

    Ok((360.0 / (1u64 << lon_bits) as f64, 180.0 / (1u64 << lat_bits) as f64))
}

fn step(bounds: &CellBounds, precision: usize, direction: Direction) -> Result<Option<String>> {
    let (dx, dy) = direction.offset();
    let center = bounds.center();

    let lat = center.lat + f64::from(dy) * bounds.height();
    if !(-90.0..=90.0).contains(&lat) {
        return Ok(None);
    }

    let mut lon = center.lon + f64::from(dx) * bounds.width();
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }

    encode(GeoPoint::new(lon, lat), precision).map(Some)
}

/// The adjacent cell in one direction, None past a pole
pub fn neighbor(cell: &str, direction: Direction) -> Result<Option<String>> {
    let bounds = decode(cell)?;
    step(&bounds, cell.len(), direction)
}

/// The 8-connected neighbours of a cell, in the order of [`Direction::ALL`].
///
/// Longitude wraps at the antimeridian. Steps beyond a pole produce nothing,
/// and duplicates or the cell itself are dropped.
pub fn neighbors(cell: &str) -> Result<Vec<String>> {
    let cell = normalize(cell)?;
    let bounds = decode(&cell)?;

    let mut result = Vec::with_capacity(8);
    for direction in Direction::ALL {
        if let Some(next) = step(&bounds, cell.len(), direction)? {
            if next != cell && !result.contains(&next) {
                result.push(next);
            }
        }
    }

    Ok(result)
}

/// The 32 cells one level finer
pub fn children(cell: &str) -> Result<Vec<String>> {
    let cell = normalize(cell)?;
    if cell.len() >= MAX_PRECISION {
        return Err(GeohasherError::InvalidPrecision { precision: cell.len() + 1 });
    }

    Ok(BASE32
        .iter()
        .map(|&c| {
            let mut child = cell.clone();
            child.push(c as char);
            child
        })
        .collect())
}

/// The enclosing cell one level coarser, None for a single character
pub fn parent(cell: &str) -> Result<Option<String>> {
    let mut cell = normalize(cell)?;
    if cell.len() == 1 {
        return Ok(None);
    }
    cell.pop();
    Ok(Some(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_known_value() {
        let hash = encode(GeoPoint::new(10.40744, 57.64911), 11).unwrap();
        assert_eq!(hash, "u4pruydqqvj");

        let hash = encode(GeoPoint::new(115.2625, -8.5069), 7).unwrap();
        assert_eq!(hash, "qw3zwg7");
    }

    #[test]
    fn test_encode_upper_half_on_midpoint() {
        assert_eq!(encode(GeoPoint::new(0.0, 0.0), 1).unwrap(), "s");
        assert_eq!(encode(GeoPoint::new(180.0, 90.0), 5).unwrap(), "zzzzz");
        assert_eq!(encode(GeoPoint::new(-180.0, -90.0), 5).unwrap(), "00000");
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        let point = GeoPoint::new(0.0, 0.0);
        assert!(matches!(encode(point, 0), Err(GeohasherError::InvalidPrecision { precision: 0 })));
        assert!(matches!(encode(point, 13), Err(GeohasherError::InvalidPrecision { .. })));

        let result = encode(GeoPoint::new(f64::NAN, 0.0), 5);
        assert!(matches!(result, Err(GeohasherError::InvalidCoordinate { .. })));

        let result = encode(GeoPoint::new(0.0, 91.0), 5);
        assert!(matches!(result, Err(GeohasherError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_decode() {
        let bounds = decode("s00").unwrap();
        assert_eq!(bounds, CellBounds::new(0.0, 0.0, 1.40625, 1.40625));

        let bounds = decode("ezs42").unwrap();
        assert_eq!(bounds, CellBounds::new(-5.625, 42.5830078125, -5.5810546875, 42.626953125));

        // Case-insensitive
        assert_eq!(decode("EZS42").unwrap(), bounds);
    }

    #[test]
    fn test_decode_rejects_invalid_cells() {
        for cell in ["", "abc", "s0o", "0123456789bcd"] {
            assert!(
                matches!(decode(cell), Err(GeohasherError::InvalidCell { .. })),
                "{} should be rejected",
                cell
            );
        }
    }

    #[test]
    fn test_cell_dimensions() {
        assert_eq!(cell_dimensions(1).unwrap(), (45.0, 45.0));
        assert_eq!(cell_dimensions(3).unwrap(), (1.40625, 1.40625));
        assert_eq!(cell_dimensions(4).unwrap(), (0.3515625, 0.17578125));
        assert!(cell_dimensions(13).is_err());

        let bounds = decode("ezs42").unwrap();
        assert_eq!(cell_dimensions(5).unwrap(), (bounds.width(), bounds.height()));
    }

    #[test]
    fn test_neighbors_known_cell() {
        let result = neighbors("ezs42").unwrap();
        assert_eq!(
            result,
            vec!["ezs48", "ezs49", "ezs43", "ezs41", "ezs40", "ezefp", "ezefr", "ezefx"]
        );

        assert_eq!(neighbor("ezs42", Direction::SouthWest).unwrap(), Some("ezefp".to_string()));
    }

    #[test]
    fn test_neighbors_wrap_and_poles() {
        // North-west corner of the world: no northern row, west wraps to the east edge
        assert_eq!(neighbors("b").unwrap(), vec!["c", "9", "8", "x", "z"]);
        assert_eq!(neighbor("b", Direction::North).unwrap(), None);

        // South-west corner
        assert_eq!(neighbors("0").unwrap(), vec!["2", "3", "1", "p", "r"]);

        // North-east corner wraps east into the western hemisphere
        assert_eq!(neighbors("zz").unwrap(), vec!["bp", "bn", "zy", "zw", "zx"]);
    }

    #[test]
    fn test_children_and_parent() {
        let kids = children("s0").unwrap();
        assert_eq!(kids.len(), 32);
        assert_eq!(kids[0], "s00");
        assert_eq!(kids[31], "s0z");

        let parent_bounds = decode("s0").unwrap();
        let area: f64 = kids.iter().map(|k| decode(k).unwrap().area()).sum();
        assert!((area - parent_bounds.area()).abs() < 1e-9);

        assert_eq!(parent("S0Z").unwrap(), Some("s0".to_string()));
        assert_eq!(parent("s").unwrap(), None);
        assert!(children("0123456789bc").is_err());
    }

    #[test]
    fn test_tiling_at_precision_two() {
        let all: Vec<String> = BASE32
            .iter()
            .flat_map(|&a| BASE32.iter().map(move |&b| format!("{}{}", a as char, b as char)))
            .collect();
        assert_eq!(all.len(), 1024);

        let bounds: Vec<CellBounds> = all.iter().map(|c| decode(c).unwrap()).collect();
        let total: f64 = bounds.iter().map(|b| b.area()).sum();
        assert!((total - 360.0 * 180.0).abs() < 1e-6);

        // Each centre lies in exactly one cell, and encodes back to it
        for (cell, b) in all.iter().zip(&bounds) {
            let center = b.center();
            let owners = bounds.iter().filter(|other| other.contains(&center)).count();
            assert_eq!(owners, 1, "centre of {} is shared", cell);
            assert_eq!(&encode(center, 2).unwrap(), cell);
        }
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(
            lon in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            precision in 1usize..=12,
        ) {
            let point = GeoPoint::new(lon, lat);
            let hash = encode(point, precision).unwrap();
            prop_assert_eq!(hash.len(), precision);

            let bounds = decode(&hash).unwrap();
            prop_assert!(bounds.contains(&point));

            let center = decode_center(&hash).unwrap();
            prop_assert_eq!(encode(center, precision).unwrap(), hash);
        }

        #[test]
        fn prop_neighbor_symmetry(
            lon in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            precision in 1usize..=9,
        ) {
            let cell = encode(GeoPoint::new(lon, lat), precision).unwrap();
            for next in neighbors(&cell).unwrap() {
                prop_assert_eq!(next.len(), precision);
                prop_assert!(
                    neighbors(&next).unwrap().contains(&cell),
                    "{} is a neighbour of {} but not the reverse", next, cell
                );
            }
        }

        #[test]
        fn prop_parent_contains_child(
            lon in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            precision in 2usize..=12,
        ) {
            let cell = encode(GeoPoint::new(lon, lat), precision).unwrap();
            let parent_cell = parent(&cell).unwrap().unwrap();
            prop_assert_eq!(&parent_cell, &encode(GeoPoint::new(lon, lat), precision - 1).unwrap());

            let outer = decode(&parent_cell).unwrap();
            let inner = decode(&cell).unwrap();
            prop_assert!(outer.contains(&GeoPoint::new(inner.min_lon, inner.min_lat)));
            prop_assert!(outer.contains(&GeoPoint::new(inner.max_lon, inner.max_lat)));
        }
    }
}
