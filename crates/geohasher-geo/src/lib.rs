//! Geohasher Geo - Geohash codec, polygon validation and coverage
//!
//! This crate turns polygons into the set of geohash cells that cover them.
//! The codec is a set of pure functions, the coverage engine flood-fills the
//! geohash grid outward from seed cells inside each polygon.

pub mod coverage;
pub mod geohash;
pub mod models;
pub mod spatial;
pub mod validation;

pub use coverage::{coverage, CoverageEngine, CoverageOptions, CoverageSet};
pub use geohash::{decode, encode, neighbors, CellBounds, Direction};
