use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geohasher_core::error::{GeohasherError, Result};
use geohasher_core::models::{Feature, Layer, OutputRow};
use geohasher_geo::geohash::validate_precision;
use geohasher_geo::{CoverageEngine, CoverageOptions, CoverageSet};
use rayon::prelude::*;

use crate::models::{BatchOptions, BatchReport, BatchSummary, FeatureOutcome};

/// Batch processor covering every feature of a layer
pub struct BatchProcessor {
    options: BatchOptions,
    cancel: Arc<AtomicBool>,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(options: BatchOptions) -> Self {
        Self { options, cancel: Arc::new(AtomicBool::new(false)) }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Shared flag; setting it cancels features that have not finished yet
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Cover every feature of a layer
    pub fn run(&self, layer: &Layer) -> Result<BatchReport> {
        self.run_with_progress(layer, |_| {})
    }

    /// Cover every feature, calling `progress` with each finished feature index
    pub fn run_with_progress<F>(&self, layer: &Layer, progress: F) -> Result<BatchReport>
    where
        F: Fn(usize) + Sync,
    {
        validate_precision(self.options.precision)?;

        tracing::info!(
            "Covering {} features of layer '{}' at precision {} ({}, {})",
            layer.len(),
            layer.name,
            self.options.precision,
            self.options.policy,
            if self.options.parallel { "parallel" } else { "sequential" }
        );

        let engine = CoverageEngine::new(
            CoverageOptions::new(self.options.policy)
                .with_max_cells(self.options.max_cells)
                .with_cancel_flag(self.cancel_flag()),
        );

        let cover = |(index, feature): (usize, &Feature)| {
            let outcome = FeatureOutcome {
                feature_id: feature.id.clone(),
                index,
                result: self.cover_feature(&engine, feature),
            };
            progress(index);
            outcome
        };

        let mut outcomes: Vec<FeatureOutcome> = if self.options.parallel {
            layer.features.par_iter().enumerate().map(cover).collect()
        } else {
            layer.features.iter().enumerate().map(cover).collect()
        };

        let duplicates_removed = if self.options.dedup { dedup_outcomes(&mut outcomes) } else { 0 };

        let rows = build_rows(layer, &outcomes);
        let summary = BatchSummary::from_outcomes(&outcomes, duplicates_removed);

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {} cancelled, {} rows",
            summary.succeeded,
            summary.failed,
            summary.cancelled,
            rows.len()
        );

        Ok(BatchReport { outcomes, rows, headers: layer.output_headers(), summary })
    }

    fn cover_feature(&self, engine: &CoverageEngine, feature: &Feature) -> Result<CoverageSet> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(GeohasherError::Cancelled);
        }

        let result = match &feature.geometry {
            Some(geometry) => engine
                .cover_geometry(geometry, self.options.precision)
                .map_err(|e| e.with_feature_id(feature.id.as_str())),
            None => Err(GeohasherError::InvalidPolygon {
                feature_id: feature.id.clone(),
                reason: "feature has no geometry".to_string(),
            }),
        };

        if let Err(err) = &result {
            if !matches!(err, GeohasherError::Cancelled) {
                tracing::warn!("Skipping feature {}: {}", feature.id, err);
                if self.options.stop_on_error {
                    self.cancel.store(true, Ordering::Relaxed);
                }
            }
        }

        result
    }
}

/// Remove cells already claimed by an earlier feature; returns the number removed
fn dedup_outcomes(outcomes: &mut [FeatureOutcome]) -> usize {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut removed = 0;

    for outcome in outcomes.iter_mut() {
        if let Ok(set) = &mut outcome.result {
            let taken: Vec<String> =
                set.iter().filter(|cell| claimed.contains(*cell)).cloned().collect();
            removed += set.remove_all(&taken);
            claimed.extend(set.iter().cloned());
        }
    }

    removed
}

fn build_rows(layer: &Layer, outcomes: &[FeatureOutcome]) -> Vec<OutputRow> {
    let mut rows = Vec::new();
    for (feature, outcome) in layer.features.iter().zip(outcomes) {
        if let Ok(set) = &outcome.result {
            let attributes = feature.attribute_strings();
            rows.extend(set.iter().map(|cell| {
                OutputRow::new(feature.id.clone(), attributes.clone(), cell.clone())
            }));
        }
    }
    rows
}
