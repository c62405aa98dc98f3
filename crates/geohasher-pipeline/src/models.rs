use geohasher_core::config::{LayeredConfig, DEFAULT_MAX_CELLS, DEFAULT_PRECISION};
use geohasher_core::error::{ErrorKind, GeohasherError, Result};
use geohasher_core::models::{CoveragePolicy, OutputRow};
use geohasher_core::sink::{write_table, RowSink};
use geohasher_geo::CoverageSet;
use serde::Serialize;

/// Options for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOptions {
    pub precision: usize,
    pub policy: CoveragePolicy,
    pub max_cells: usize,
    /// Keep each cell only for the first feature (in input order) that covers it
    pub dedup: bool,
    /// Cancel the remaining features after the first failure
    pub stop_on_error: bool,
    /// Fan features out over the rayon thread pool
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            policy: CoveragePolicy::Intersects,
            max_cells: DEFAULT_MAX_CELLS,
            dedup: false,
            stop_on_error: false,
            parallel: true,
        }
    }
}

impl BatchOptions {
    /// Take every option from the effective configuration
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            precision: config.precision.value,
            policy: config.policy.value,
            max_cells: config.max_cells.value,
            dedup: config.dedup.value,
            stop_on_error: config.stop_on_error.value,
            parallel: config.parallel.value,
        }
    }
}

/// Coverage result of one feature
#[derive(Debug)]
pub struct FeatureOutcome {
    pub feature_id: String,
    /// Position of the feature in the input layer
    pub index: usize,
    pub result: Result<CoverageSet>,
}

impl FeatureOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&GeohasherError> {
        self.result.as_ref().err()
    }
}

/// A failed feature, flattened for display and JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureFailure {
    pub feature_id: String,
    pub index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

/// Counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_features: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Features abandoned because the batch was cancelled
    pub cancelled: usize,
    pub total_cells: usize,
    pub cells_visited: usize,
    pub duplicates_removed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FeatureOutcome], duplicates_removed: usize) -> Self {
        let mut summary = Self {
            total_features: outcomes.len(),
            duplicates_removed,
            ..Default::default()
        };

        for outcome in outcomes {
            match &outcome.result {
                Ok(set) => {
                    summary.succeeded += 1;
                    summary.total_cells += set.len();
                    summary.cells_visited += set.cells_visited();
                }
                Err(GeohasherError::Cancelled) => summary.cancelled += 1,
                Err(_) => summary.failed += 1,
            }
        }

        summary
    }

    /// Check if every feature succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

/// Everything a batch run produced
#[derive(Debug)]
pub struct BatchReport {
    /// One outcome per feature, in input order
    pub outcomes: Vec<FeatureOutcome>,
    /// Output rows in feature order, then geohash order
    pub rows: Vec<OutputRow>,
    /// Layer fields followed by `geohash`
    pub headers: Vec<String>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Every failed feature, cancelled ones included
    pub fn failures(&self) -> Vec<FeatureFailure> {
        self.outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.error().map(|err| FeatureFailure {
                    feature_id: outcome.feature_id.clone(),
                    index: outcome.index,
                    kind: err.kind(),
                    message: err.to_string(),
                })
            })
            .collect()
    }

    /// The earliest real failure in input order.
    ///
    /// Features cancelled because of another failure are skipped, so in a
    /// parallel run this is the failure a sequential run would have hit first.
    pub fn first_failure(&self) -> Option<&FeatureOutcome> {
        self.outcomes
            .iter()
            .find(|o| matches!(o.result, Err(ref e) if !matches!(e, GeohasherError::Cancelled)))
            .or_else(|| self.outcomes.iter().find(|o| o.result.is_err()))
    }

    pub fn has_failures(&self) -> bool {
        !self.summary.all_succeeded()
    }

    /// Write headers and rows to a sink
    pub fn write_to<S: RowSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        write_table(sink, &self.headers, &self.rows)
    }
}
