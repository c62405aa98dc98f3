//! Geohasher Core - Domain models, configuration, layer readers and output sinks
//!
//! This crate contains the data model shared by the coverage engine, the batch
//! pipeline and the CLI, together with the error taxonomy.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod sink;

pub use error::{ErrorKind, GeohasherError, Result};
