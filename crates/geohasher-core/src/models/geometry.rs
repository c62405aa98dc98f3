//! Canonical geometry types used across all geohasher crates.
//!
//! Rings are plain ordered coordinate sequences. The `Geometry` enum mirrors the
//! GeoJSON polygon types so a feature's geometry can be deserialized directly,
//! and converts to a list of [`Polygon`] parts for the coverage engine.

use serde::{Deserialize, Serialize};

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Check that both coordinates are finite and inside the lon/lat domain
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords[0], coords[1])
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// Axis-aligned rectangle in lon/lat degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    /// Smallest box enclosing all points, None for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self::new(p.lon, p.lat, p.lon, p.lat),
                Some(b) => Self::new(
                    b.min_lon.min(p.lon),
                    b.min_lat.min(p.lat),
                    b.max_lon.max(p.lon),
                    b.max_lat.max(p.lat),
                ),
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.min_lon + self.max_lon) / 2.0, (self.min_lat + self.max_lat) / 2.0)
    }

    /// Corners in counter-clockwise order starting at the south-west corner
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            GeoPoint::new(self.min_lon, self.min_lat),
            GeoPoint::new(self.max_lon, self.min_lat),
            GeoPoint::new(self.max_lon, self.max_lat),
            GeoPoint::new(self.min_lon, self.max_lat),
        ]
    }

    /// Closed containment test (edges included)
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }

    /// Merge two boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_lon.min(other.min_lon),
            self.min_lat.min(other.min_lat),
            self.max_lon.max(other.max_lon),
            self.max_lat.max(other.max_lat),
        )
    }
}

/// A polygon: one exterior ring and zero or more holes.
///
/// Rings are implicitly closed; a repeated closing point is allowed but not required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<GeoPoint>,
    #[serde(default)]
    pub holes: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> Self {
        Self { exterior, holes }
    }

    /// Build a polygon without holes from `(lon, lat)` pairs
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().copied().map(GeoPoint::from).collect(), Vec::new())
    }

    /// Build a polygon from GeoJSON-style rings, first ring is the exterior
    pub fn from_rings(rings: &[Vec<[f64; 2]>]) -> Self {
        let mut rings = rings
            .iter()
            .map(|ring| ring.iter().copied().map(GeoPoint::from).collect::<Vec<GeoPoint>>());
        let exterior = rings.next().unwrap_or_default();
        Self::new(exterior, rings.collect())
    }

    /// All rings, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &Vec<GeoPoint>> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Bounding box of the exterior ring
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.exterior)
    }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Polygon,
    MultiPolygon,
}

/// GeoJSON-compatible areal geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Create a MultiPolygon geometry
    pub fn multi_polygon(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> Self {
        Geometry::MultiPolygon { coordinates: polygons }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
        }
    }

    /// Flatten into polygon parts
    pub fn parts(&self) -> Vec<Polygon> {
        match self {
            Geometry::Polygon { coordinates } => vec![Polygon::from_rings(coordinates)],
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().map(|rings| Polygon::from_rings(rings)).collect()
            }
        }
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        let ring = |points: &Vec<GeoPoint>| -> Vec<[f64; 2]> {
            points.iter().map(|p| [p.lon, p.lat]).collect()
        };
        Geometry::Polygon { coordinates: polygon.rings().map(ring).collect() }
    }
}

/// Rule deciding whether a cell counts as covering a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// The cell rectangle and the polygon share a positive area
    #[default]
    Intersects,
    /// The cell center lies inside the polygon or on its boundary
    ContainsCenter,
    /// The whole cell rectangle lies inside the polygon
    FullyContained,
}

impl CoveragePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoveragePolicy::Intersects => "intersects",
            CoveragePolicy::ContainsCenter => "contains_center",
            CoveragePolicy::FullyContained => "fully_contained",
        }
    }
}

impl std::fmt::Display for CoveragePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
