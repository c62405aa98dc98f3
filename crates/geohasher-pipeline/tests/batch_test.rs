//! Batch runs over whole layers, written through the CSV sink

use std::collections::HashSet;

use geohasher_core::models::{CoveragePolicy, Feature, Geometry, Layer};
use geohasher_core::sink::{CsvSink, MemorySink};
use geohasher_pipeline::{BatchOptions, BatchProcessor};
use proptest::prelude::*;
use serde_json::json;

fn square(x: f64, y: f64, size: f64) -> Geometry {
    Geometry::polygon(vec![vec![
        [x, y],
        [x + size, y],
        [x + size, y + size],
        [x, y + size],
        [x, y],
    ]])
}

fn parcels() -> Layer {
    let features = (0..12)
        .map(|i| {
            let x = 100.0 + (i % 4) as f64 * 0.3;
            let y = -8.0 + (i / 4) as f64 * 0.3;
            let attributes = vec![json!(format!("parcel {}", i)), json!(i * 10)];
            Feature::new(i.to_string(), attributes, square(x, y, 0.4))
        })
        .collect();
    Layer::new("parcels", vec!["name".to_string(), "value".to_string()], features)
}

#[test]
fn test_parallel_matches_sequential() {
    let layer = parcels();
    let base = BatchOptions { precision: 5, ..Default::default() };

    let parallel =
        BatchProcessor::new(BatchOptions { parallel: true, ..base.clone() }).run(&layer).unwrap();
    let sequential =
        BatchProcessor::new(BatchOptions { parallel: false, ..base }).run(&layer).unwrap();

    assert_eq!(parallel.rows, sequential.rows);
    assert_eq!(parallel.summary, sequential.summary);
    let ids: Vec<&str> = parallel.outcomes.iter().map(|o| o.feature_id.as_str()).collect();
    assert_eq!(ids, (0..12).map(|i| i.to_string()).collect::<Vec<_>>());
}

#[test]
fn test_dedup_partitions_cells() {
    let layer = parcels();
    let base = BatchOptions { precision: 5, parallel: true, ..Default::default() };

    let plain = BatchProcessor::new(base.clone()).run(&layer).unwrap();
    let deduped = BatchProcessor::new(BatchOptions { dedup: true, ..base }).run(&layer).unwrap();

    let all: HashSet<&str> = plain.rows.iter().map(|r| r.geohash.as_str()).collect();
    let kept: Vec<&str> = deduped.rows.iter().map(|r| r.geohash.as_str()).collect();
    let kept_unique: HashSet<&str> = kept.iter().copied().collect();

    // Same cells, each exactly once
    assert_eq!(kept.len(), kept_unique.len());
    assert_eq!(kept_unique, all);
    assert_eq!(deduped.summary.duplicates_removed, plain.rows.len() - deduped.rows.len());
}

#[test]
fn test_report_to_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcels.csv");

    let layer = Layer::new(
        "unit",
        vec!["name".to_string()],
        vec![Feature::new("0", vec![json!("Unit, square")], square(0.0, 0.0, 1.0))],
    );
    let options = BatchOptions { precision: 3, ..Default::default() };
    let report = BatchProcessor::new(options).run(&layer).unwrap();

    let mut sink = CsvSink::create(&path).unwrap();
    assert_eq!(report.write_to(&mut sink).unwrap(), 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "name,geohash\n\"Unit, square\",s00\n");
}

#[test]
fn test_empty_result_writes_nothing() {
    let layer = Layer::new(
        "unit",
        vec!["name".to_string()],
        vec![Feature::new("0", vec![json!("tiny")], square(0.0, 0.0, 1.0))],
    );
    let options =
        BatchOptions { precision: 3, policy: CoveragePolicy::FullyContained, ..Default::default() };
    let report = BatchProcessor::new(options).run(&layer).unwrap();

    let mut sink = MemorySink::new();
    assert_eq!(report.write_to(&mut sink).unwrap(), 0);
    assert!(sink.headers.is_none());
    assert!(report.summary.all_succeeded());
}

#[test]
fn test_resource_limit_is_per_feature() {
    let layer = Layer::new(
        "mixed",
        vec![],
        vec![
            Feature::new("big", vec![], square(0.0, 0.0, 5.0)),
            Feature::new("small", vec![], square(20.0, 20.0, 0.01)),
        ],
    );
    let options =
        BatchOptions { precision: 6, max_cells: 500, parallel: false, ..Default::default() };
    let report = BatchProcessor::new(options).run(&layer).unwrap();

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].feature_id, "big");
    assert_eq!(failures[0].kind.to_string(), "ResourceLimitExceeded");
    assert!(report.outcomes[1].is_ok());
}

#[test]
fn test_progress_sees_every_feature() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let layer = parcels();
    let seen = AtomicUsize::new(0);
    let options = BatchOptions { precision: 4, ..Default::default() };

    BatchProcessor::new(options)
        .run_with_progress(&layer, |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

    assert_eq!(seen.load(Ordering::Relaxed), 12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_dedup_gives_each_cell_to_its_first_owner(
        offsets in proptest::collection::vec((0.0f64..2.0, 0.0f64..2.0), 2..6),
    ) {
        let features: Vec<Feature> = offsets
            .iter()
            .enumerate()
            .map(|(i, (x, y))| Feature::new(i.to_string(), vec![], square(*x, *y, 0.5)))
            .collect();
        let layer = Layer::new("random", vec![], features);

        let base = BatchOptions { precision: 4, ..Default::default() };
        let plain = BatchProcessor::new(base.clone()).run(&layer).unwrap();
        let deduped =
            BatchProcessor::new(BatchOptions { dedup: true, ..base }).run(&layer).unwrap();

        for row in &deduped.rows {
            let first_owner = plain.rows.iter().find(|r| r.geohash == row.geohash).unwrap();
            prop_assert_eq!(&first_owner.feature_id, &row.feature_id);
        }
    }
}
