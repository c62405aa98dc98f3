//! Geometry models for geohasher-geo.
//!
//! This module re-exports canonical types from `geohasher-core` and provides
//! conversions to/from the `geo` crate.

use geo::algorithm::centroid::Centroid;
use geo::algorithm::interior_point::InteriorPoint;

// Re-export canonical types from geohasher-core
pub use geohasher_core::models::{
    BoundingBox, CoveragePolicy, GeoPoint, Geometry, GeometryType, Polygon,
};

fn to_line_string(ring: &[GeoPoint]) -> geo::LineString<f64> {
    geo::LineString::new(ring.iter().map(|p| geo::Coord { x: p.lon, y: p.lat }).collect())
}

/// Convert a canonical Polygon to a geo::Polygon (rings are closed by `geo`)
pub fn to_geo_polygon(polygon: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_line_string(&polygon.exterior),
        polygon.holes.iter().map(|hole| to_line_string(hole)).collect(),
    )
}

/// Extension trait for Polygon with geo-crate operations
pub trait PolygonExt {
    /// Convert to geo::Polygon
    fn to_geo(&self) -> geo::Polygon<f64>;

    /// A point guaranteed to lie inside the polygon
    fn interior_point(&self) -> Option<GeoPoint>;

    /// Area-weighted centroid, which may fall outside a concave polygon
    fn centroid_point(&self) -> Option<GeoPoint>;
}

impl PolygonExt for Polygon {
    fn to_geo(&self) -> geo::Polygon<f64> {
        to_geo_polygon(self)
    }

    fn interior_point(&self) -> Option<GeoPoint> {
        self.to_geo().interior_point().map(|p| GeoPoint::new(p.x(), p.y()))
    }

    fn centroid_point(&self) -> Option<GeoPoint> {
        self.to_geo().centroid().map(|p| GeoPoint::new(p.x(), p.y()))
    }
}
