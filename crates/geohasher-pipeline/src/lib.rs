//! Geohasher Pipeline - Batch coverage of feature layers
//!
//! This crate runs the coverage engine over every feature of a layer, applies
//! the stop-on-error and dedup policies, and builds the output rows.

pub mod batch;
pub mod models;

pub use batch::BatchProcessor;
pub use models::{BatchOptions, BatchReport, BatchSummary, FeatureFailure, FeatureOutcome};
