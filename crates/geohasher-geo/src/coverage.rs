//! Polygon coverage engine
//!
//! Finds every geohash cell of one precision that covers a polygon by
//! flood-filling the grid from seed cells inside it. A cell whose rectangle
//! shares a positive area with the polygon is *explorable* and pushes its
//! unvisited neighbours onto the queue; the coverage policy only decides which
//! explorable cells end up in the result. Because the explorable region of a
//! connected polygon is 8-connected, the fill reaches every overlapping cell
//! without scanning the bounding box.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::geohash::{decode, encode, neighbors, validate_precision};
use crate::models::{CoveragePolicy, GeoPoint, Geometry, Polygon, PolygonExt};
use crate::spatial::{is_positive_overlap, ring_area, PreparedPolygon};
use crate::validation::ensure_valid;
use geohasher_core::config::DEFAULT_MAX_CELLS;
use geohasher_core::error::{GeohasherError, Result};

/// Options for one coverage computation
#[derive(Debug, Clone)]
pub struct CoverageOptions {
    pub policy: CoveragePolicy,
    /// Upper bound on cells visited before giving up
    pub max_cells: usize,
    /// Checked between queue pops; set it to abandon the computation
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        Self { policy: CoveragePolicy::default(), max_cells: DEFAULT_MAX_CELLS, cancel: None }
    }
}

impl CoverageOptions {
    pub fn new(policy: CoveragePolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// The cells covering one feature, sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageSet {
    cells: BTreeSet<String>,
    precision: usize,
    policy: CoveragePolicy,
    cells_visited: usize,
}

impl CoverageSet {
    pub fn new(precision: usize, policy: CoveragePolicy) -> Self {
        Self { cells: BTreeSet::new(), precision, policy, cells_visited: 0 }
    }

    pub fn cells(&self) -> &BTreeSet<String> {
        &self.cells
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn policy(&self) -> CoveragePolicy {
        self.policy
    }

    /// Number of cells the flood fill tested
    pub fn cells_visited(&self) -> usize {
        self.cells_visited
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &str) -> bool {
        self.cells.contains(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.cells.iter()
    }

    /// Drop the given cells, returning how many were removed
    pub fn remove_all<'a>(&mut self, cells: impl IntoIterator<Item = &'a String>) -> usize {
        let mut removed = 0;
        for cell in cells {
            if self.cells.remove(cell.as_str()) {
                removed += 1;
            }
        }
        removed
    }

    pub fn into_cells(self) -> BTreeSet<String> {
        self.cells
    }
}

impl<'a> IntoIterator for &'a CoverageSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Per-part traversal state
struct FloodFill {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    explorable: usize,
}

impl FloodFill {
    fn new() -> Self {
        Self { queue: VecDeque::new(), visited: HashSet::new(), explorable: 0 }
    }
}

/// Coverage engine
pub struct CoverageEngine {
    options: CoverageOptions,
}

impl CoverageEngine {
    pub fn new(options: CoverageOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CoverageOptions {
        &self.options
    }

    /// Cover a single polygon
    pub fn cover_polygon(&self, polygon: &Polygon, precision: usize) -> Result<CoverageSet> {
        self.cover_geometry(&Geometry::from(polygon.clone()), precision)
    }

    /// Cover a Polygon or MultiPolygon; multi-part input yields the union of its parts
    pub fn cover_geometry(&self, geometry: &Geometry, precision: usize) -> Result<CoverageSet> {
        validate_precision(precision)?;
        ensure_valid(geometry, "")?;

        let parts = geometry.parts();
        let mut set = CoverageSet::new(precision, self.options.policy);
        for part in &parts {
            self.cover_part(&PreparedPolygon::new(part.clone()), &mut set)?;
        }

        tracing::debug!(
            "Covered {} part(s) at precision {} with {} cells ({} visited, policy {})",
            parts.len(),
            precision,
            set.len(),
            set.cells_visited,
            set.policy
        );

        Ok(set)
    }

    fn cover_part(&self, part: &PreparedPolygon, set: &mut CoverageSet) -> Result<()> {
        let Some(bbox) = part.bounding_box() else {
            return Ok(());
        };
        let precision = set.precision;
        let interior = part.polygon().interior_point();

        let mut fill = FloodFill::new();
        let seeds = [interior, part.polygon().centroid_point(), Some(bbox.center())];
        for seed in seeds.into_iter().flatten().filter(GeoPoint::is_valid) {
            self.visit(&mut fill, encode(seed, precision)?, set)?;
        }

        let before = set.len();
        self.drain(&mut fill, part, set)?;

        if fill.explorable == 0 {
            tracing::debug!("No seed cell overlaps the polygon, probing bounding box corners");
            for corner in bbox.corners() {
                self.visit(&mut fill, encode(corner, precision)?, set)?;
            }
            self.drain(&mut fill, part, set)?;
        }

        if set.len() == before
            && self.options.policy == CoveragePolicy::Intersects
            && ring_area(&part.polygon().exterior).abs() > 0.0
        {
            if let Some(point) = interior {
                tracing::debug!("Falling back to the interior point cell");
                set.cells.insert(encode(point, precision)?);
            }
        }

        Ok(())
    }

    /// Mark a cell visited and queue it, enforcing the visit limit
    fn visit(&self, fill: &mut FloodFill, cell: String, set: &mut CoverageSet) -> Result<()> {
        if !fill.visited.insert(cell.clone()) {
            return Ok(());
        }

        set.cells_visited += 1;
        if set.cells_visited > self.options.max_cells {
            return Err(GeohasherError::ResourceLimitExceeded {
                feature_id: String::new(),
                limit: self.options.max_cells,
            });
        }

        fill.queue.push_back(cell);
        Ok(())
    }

    fn drain(
        &self,
        fill: &mut FloodFill,
        part: &PreparedPolygon,
        set: &mut CoverageSet,
    ) -> Result<()> {
        while let Some(cell) = fill.queue.pop_front() {
            if self.is_cancelled() {
                return Err(GeohasherError::Cancelled);
            }

            let bounds = decode(&cell)?;
            let overlap = part.overlap_area(&bounds);
            if !is_positive_overlap(overlap, &bounds) {
                continue;
            }
            fill.explorable += 1;

            for next in neighbors(&cell)? {
                self.visit(fill, next, set)?;
            }

            if part.admits(self.options.policy, &bounds, overlap) {
                set.cells.insert(cell);
            }
        }

        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.options.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Cover a polygon with default limits
pub fn coverage(
    polygon: &Polygon,
    precision: usize,
    policy: CoveragePolicy,
) -> Result<CoverageSet> {
    CoverageEngine::new(CoverageOptions::new(policy)).cover_polygon(polygon, precision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
    }

    fn cells(set: &CoverageSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_unit_square_precision_three() {
        let set = coverage(&unit_square(), 3, CoveragePolicy::Intersects).unwrap();
        assert_eq!(cells(&set), vec!["s00"]);
        assert_eq!(set.precision(), 3);
        assert!(set.cells_visited() >= 9);

        let set = coverage(&unit_square(), 3, CoveragePolicy::ContainsCenter).unwrap();
        assert_eq!(cells(&set), vec!["s00"]);

        let set = coverage(&unit_square(), 3, CoveragePolicy::FullyContained).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_invalid_precision() {
        let result = coverage(&unit_square(), 0, CoveragePolicy::Intersects);
        assert!(matches!(result, Err(GeohasherError::InvalidPrecision { precision: 0 })));

        let result = coverage(&unit_square(), 13, CoveragePolicy::Intersects);
        assert!(matches!(result, Err(GeohasherError::InvalidPrecision { precision: 13 })));
    }

    #[test]
    fn test_invalid_polygon_is_rejected() {
        let line = Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0)]);
        let result = coverage(&line, 5, CoveragePolicy::Intersects);
        assert!(matches!(result, Err(GeohasherError::InvalidPolygon { .. })));
    }

    #[test]
    fn test_resource_limit() {
        let engine = CoverageEngine::new(CoverageOptions::default().with_max_cells(50));
        let result = engine.cover_polygon(&unit_square(), 6);

        assert!(matches!(result, Err(GeohasherError::ResourceLimitExceeded { limit: 50, .. })));
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let engine = CoverageEngine::new(CoverageOptions::default().with_cancel_flag(flag));

        let result = engine.cover_polygon(&unit_square(), 4);
        assert!(matches!(result, Err(GeohasherError::Cancelled)));
    }

    #[test]
    fn test_remove_all() {
        let mut set = coverage(&unit_square(), 4, CoveragePolicy::Intersects).unwrap();
        let taken: Vec<String> = vec!["s000".to_string(), "zzzz".to_string()];

        assert_eq!(set.remove_all(&taken), 1);
        assert!(!set.contains("s000"));
        assert_eq!(set.len(), 17);
    }
}
