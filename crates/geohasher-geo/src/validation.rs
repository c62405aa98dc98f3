use crate::models::{GeoPoint, Geometry, Polygon};
use crate::spatial::ring_area;
use geo::algorithm::intersects::Intersects;
use geohasher_core::error::{GeohasherError, Result};

/// Rings with an absolute area below this (square degrees) are degenerate
pub const MIN_RING_AREA: f64 = 1e-15;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Pull in another result's errors, prefixing their locations
    fn absorb(&mut self, prefix: &str, other: ValidationResult) {
        for error in other.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }
}

/// Validate every polygon part of a geometry
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    let mut result = ValidationResult::valid();

    match geometry {
        Geometry::Polygon { .. } => {
            for polygon in geometry.parts() {
                result.absorb("Polygon", validate_polygon(&polygon));
            }
        }
        Geometry::MultiPolygon { .. } => {
            let parts = geometry.parts();
            if parts.is_empty() {
                result
                    .add_error("MultiPolygon".to_string(), "MultiPolygon has no parts".to_string());
            }
            for (i, polygon) in parts.iter().enumerate() {
                result.absorb(&format!("MultiPolygon[{}]", i), validate_polygon(polygon));
            }
        }
    }

    result
}

/// Validate the exterior ring and every hole of a polygon
pub fn validate_polygon(polygon: &Polygon) -> ValidationResult {
    let mut result = validate_ring(&polygon.exterior, "exterior");

    for (i, hole) in polygon.holes.iter().enumerate() {
        let hole_result = validate_ring(hole, &format!("interior[{}]", i));
        result.errors.extend(hole_result.errors);
    }
    result.is_valid = result.errors.is_empty();

    result
}

/// Validate a single ring: coordinates, distinct points, area and simplicity
pub fn validate_ring(ring: &[GeoPoint], location: &str) -> ValidationResult {
    let mut result = ValidationResult::valid();

    for (i, point) in ring.iter().enumerate() {
        if !point.lon.is_finite() || !point.lat.is_finite() {
            result.add_error(
                format!("{}[{}]", location, i),
                "Coordinates must be finite".to_string(),
            );
        } else if !point.is_valid() {
            result.add_error(
                format!("{}[{}]", location, i),
                format!("Coordinate ({}, {}) is outside the lon/lat range", point.lon, point.lat),
            );
        }
    }
    if !result.is_valid {
        return result;
    }

    let vertices = open_ring(ring);
    let mut distinct: Vec<&GeoPoint> = Vec::with_capacity(3);
    for point in &vertices {
        if !distinct.contains(&point) {
            distinct.push(point);
            if distinct.len() == 3 {
                break;
            }
        }
    }
    if distinct.len() < 3 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 3 distinct points, found {}", distinct.len()),
        );
        return result;
    }

    if ring_area(&vertices).abs() <= MIN_RING_AREA {
        result.add_error(location.to_string(), "Ring has zero area".to_string());
        return result;
    }

    if let Some((a, b)) = first_self_intersection(&vertices) {
        result.add_error(
            location.to_string(),
            format!("Ring is self-intersecting: edge {} crosses edge {}", a, b),
        );
    }

    result
}

/// Ring vertices without the closing duplicate and without repeated consecutive points
fn open_ring(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut vertices: Vec<GeoPoint> = Vec::with_capacity(ring.len());
    for point in ring {
        if vertices.last() != Some(point) {
            vertices.push(*point);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

/// Find two non-adjacent edges that touch or cross.
///
/// Edges are swept west to east, so each edge is only tested against edges
/// whose longitude span overlaps its own. Rings whose edges all share one
/// longitude band still test every pair.
fn first_self_intersection(vertices: &[GeoPoint]) -> Option<(usize, usize)> {
    let n = vertices.len();
    let edges: Vec<geo::Line<f64>> = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            geo::Line::new(geo::coord! { x: a.lon, y: a.lat }, geo::coord! { x: b.lon, y: b.lat })
        })
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| west(&edges[a]).total_cmp(&west(&edges[b])));

    for (k, &i) in order.iter().enumerate() {
        let east_i = east(&edges[i]);
        for &j in &order[k + 1..] {
            if west(&edges[j]) > east_i {
                break;
            }
            // Neighbours share a vertex, first and last share the closing one
            let gap = i.abs_diff(j);
            if gap == 1 || gap == n - 1 || !lat_spans_overlap(&edges[i], &edges[j]) {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return Some((i.min(j), i.max(j)));
            }
        }
    }

    None
}

fn west(edge: &geo::Line<f64>) -> f64 {
    edge.start.x.min(edge.end.x)
}

fn east(edge: &geo::Line<f64>) -> f64 {
    edge.start.x.max(edge.end.x)
}

fn lat_spans_overlap(a: &geo::Line<f64>, b: &geo::Line<f64>) -> bool {
    a.start.y.min(a.end.y) <= b.start.y.max(b.end.y)
        && b.start.y.min(b.end.y) <= a.start.y.max(a.end.y)
}

/// Validate a geometry and convert the first problem into an error
pub fn ensure_valid(geometry: &Geometry, feature_id: &str) -> Result<()> {
    let result = validate_geometry(geometry);
    match result.errors.first() {
        None => Ok(()),
        Some(error) => Err(GeohasherError::InvalidPolygon {
            feature_id: feature_id.to_string(),
            reason: format!("{}: {}", error.location, error.reason),
        }),
    }
}
