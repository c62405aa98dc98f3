pub mod feature;
pub mod geometry;

pub use feature::{render_value, Feature, Layer, OutputRow};
pub use geometry::{BoundingBox, CoveragePolicy, GeoPoint, Geometry, GeometryType, Polygon};
