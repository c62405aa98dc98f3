//! Polygon/rectangle predicates used by the coverage engine.
//!
//! Overlap is measured as an area: each ring is clipped against the
//! axis-aligned cell rectangle (Sutherland–Hodgman) and the clipped exterior
//! area minus the clipped hole areas is the shared area. A polygon that only
//! touches a cell along an edge or at a corner clips to a degenerate ring with
//! zero area.

use crate::models::{BoundingBox, CoveragePolicy, GeoPoint, Polygon, PolygonExt};
use geo::algorithm::intersects::Intersects;

/// Rounding slack, in units of `f64::EPSILON`, allowed on clipped coordinates
const ROUNDING_ULPS: f64 = 16.0;

/// Relative tolerance for treating a cell as fully covered
pub const CONTAINMENT_TOLERANCE: f64 = 1e-9;

/// Signed shoelace area of a ring (counter-clockwise positive).
///
/// Coordinates are taken relative to the first vertex so that a ring lying on
/// an axis-aligned line evaluates to exactly zero.
pub fn ring_area(ring: &[GeoPoint]) -> f64 {
    let Some(origin) = ring.first() else {
        return 0.0;
    };

    let n = ring.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let (ax, ay) = (a.lon - origin.lon, a.lat - origin.lat);
        let (bx, by) = (b.lon - origin.lon, b.lat - origin.lat);
        twice_area += ax * by - bx * ay;
    }

    twice_area / 2.0
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Edge {
    fn inside(&self, p: &GeoPoint) -> bool {
        match *self {
            Edge::Left(x) => p.lon >= x,
            Edge::Right(x) => p.lon <= x,
            Edge::Bottom(y) => p.lat >= y,
            Edge::Top(y) => p.lat <= y,
        }
    }

    fn intersection(&self, a: &GeoPoint, b: &GeoPoint) -> GeoPoint {
        match *self {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - a.lon) / (b.lon - a.lon);
                GeoPoint::new(x, a.lat + t * (b.lat - a.lat))
            }
            Edge::Bottom(y) | Edge::Top(y) => {
                let t = (y - a.lat) / (b.lat - a.lat);
                GeoPoint::new(a.lon + t * (b.lon - a.lon), y)
            }
        }
    }
}

/// Clip a ring to a rectangle (Sutherland–Hodgman).
///
/// The result may contain degenerate spikes along the rectangle border; they
/// contribute no area.
pub fn clip_ring(ring: &[GeoPoint], rect: &BoundingBox) -> Vec<GeoPoint> {
    let edges = [
        Edge::Left(rect.min_lon),
        Edge::Right(rect.max_lon),
        Edge::Bottom(rect.min_lat),
        Edge::Top(rect.max_lat),
    ];

    let mut output: Vec<GeoPoint> = ring.to_vec();
    for edge in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for current in input {
            match (edge.inside(&prev), edge.inside(&current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(edge.intersection(&prev, &current)),
                (false, true) => {
                    output.push(edge.intersection(&prev, &current));
                    output.push(current);
                }
                (false, false) => {}
            }
            prev = current;
        }
    }

    output
}

/// Area shared by a polygon and a rectangle
pub fn overlap_area(polygon: &Polygon, rect: &BoundingBox) -> f64 {
    let exterior = ring_area(&clip_ring(&polygon.exterior, rect)).abs();
    if exterior == 0.0 {
        return 0.0;
    }

    let holes: f64 = polygon.holes.iter().map(|hole| ring_area(&clip_ring(hole, rect)).abs()).sum();

    (exterior - holes).max(0.0)
}

/// Check whether two rectangles share a positive area
pub fn rects_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_lon < b.max_lon && b.min_lon < a.max_lon && a.min_lat < b.max_lat && b.min_lat < a.max_lat
}

/// A polygon with its `geo` form and bounding box computed once
#[derive(Debug, Clone)]
pub struct PreparedPolygon {
    polygon: Polygon,
    geo: geo::Polygon<f64>,
    bbox: Option<BoundingBox>,
}

impl PreparedPolygon {
    pub fn new(polygon: Polygon) -> Self {
        let geo = polygon.to_geo();
        let bbox = polygon.bounding_box();
        Self { polygon, geo, bbox }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Area shared with a cell rectangle, skipping the clip when the boxes are apart
    pub fn overlap_area(&self, rect: &BoundingBox) -> f64 {
        match &self.bbox {
            Some(bbox) if rects_overlap(bbox, rect) => overlap_area(&self.polygon, rect),
            _ => 0.0,
        }
    }

    /// Point in polygon, boundary included
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        self.geo.intersects(&geo::Point::new(point.lon, point.lat))
    }

    /// Decide membership of a cell whose overlap area is already known
    pub fn admits(&self, policy: CoveragePolicy, rect: &BoundingBox, overlap: f64) -> bool {
        match policy {
            CoveragePolicy::Intersects => is_positive_overlap(overlap, rect),
            CoveragePolicy::ContainsCenter => self.contains_point(&rect.center()),
            CoveragePolicy::FullyContained => {
                overlap >= rect.area() * (1.0 - CONTAINMENT_TOLERANCE)
            }
        }
    }
}

/// Whether an overlap area is more than a touch for this cell.
///
/// Edge and corner touches clip to rings lying on the rectangle border. The
/// only area such a ring can show comes from rounding of the clipped
/// coordinates, bounded by the cell perimeter times the coordinate ulp.
pub fn is_positive_overlap(overlap: f64, rect: &BoundingBox) -> bool {
    overlap > touch_tolerance(rect)
}

fn touch_tolerance(rect: &BoundingBox) -> f64 {
    let magnitude = [rect.min_lon, rect.max_lon, rect.min_lat, rect.max_lat]
        .iter()
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    ROUNDING_ULPS * f64::EPSILON * magnitude * (rect.width() + rect.height())
}
