//! GeoJSON layer reader

use async_trait::async_trait;
use std::path::Path;

use crate::error::{GeohasherError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{FormatReader, FormatValidation};
use crate::models::{Feature, Geometry, Layer};

/// GeoJSON format reader
pub struct GeoJsonReader;

#[async_trait]
impl FormatReader for GeoJsonReader {
    async fn read(&self, path: &Path) -> Result<Layer> {
        let content = tokio::fs::read_to_string(path).await?;

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string();

        parse_layer(&content, name)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["geojson", "json"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let size_validation = FormatValidator::validate_file_size(path);
        let json_validation = FormatValidator::validate_json_structure(path);

        Ok(FormatValidator::merge_validations(vec![validation, size_validation, json_validation]))
    }
}

/// Parse GeoJSON text into a layer.
///
/// Accepts a FeatureCollection, a single Feature or a bare Geometry. The field
/// list is the union of property keys in the order they are first seen.
pub fn parse_layer(content: &str, name: impl Into<String>) -> Result<Layer> {
    let geojson: geojson::GeoJson = content.parse().map_err(|e| GeohasherError::FormatValidation {
        format: "GeoJSON".to_string(),
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    let source_features: Vec<geojson::Feature> = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc.features,
        geojson::GeoJson::Feature(feature) => vec![feature],
        geojson::GeoJson::Geometry(geometry) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut fields: Vec<String> = Vec::new();
    for feature in &source_features {
        if let Some(props) = &feature.properties {
            for key in props.keys() {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
        }
    }

    let features = source_features
        .iter()
        .enumerate()
        .map(|(idx, feature)| convert_feature(feature, idx, &fields))
        .collect::<Result<Vec<_>>>()?;

    Ok(Layer::new(name, fields, features))
}

/// Convert a GeoJSON feature into a layer feature
fn convert_feature(feature: &geojson::Feature, idx: usize, fields: &[String]) -> Result<Feature> {
    // Get feature ID (use index if not present)
    let id = feature
        .id
        .as_ref()
        .map(|id| match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        })
        .unwrap_or_else(|| idx.to_string());

    let attributes = fields
        .iter()
        .map(|field| {
            feature
                .properties
                .as_ref()
                .and_then(|props| props.get(field))
                .cloned()
                .unwrap_or(serde_json::Value::Null)
        })
        .collect();

    match &feature.geometry {
        Some(geometry) => {
            let geometry = convert_geometry(&geometry.value, &id)?;
            Ok(Feature::new(id, attributes, geometry))
        }
        None => Ok(Feature::without_geometry(id, attributes)),
    }
}

fn convert_geometry(value: &geojson::Value, feature_id: &str) -> Result<Geometry> {
    match value {
        geojson::Value::Polygon(rings) => Ok(Geometry::polygon(convert_rings(rings, feature_id)?)),
        geojson::Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| convert_rings(rings, feature_id))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::multi_polygon(polygons))
        }
        other => Err(GeohasherError::UnsupportedGeometry {
            feature_id: feature_id.to_string(),
            geometry_type: other.type_name().to_string(),
        }),
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>], feature_id: &str) -> Result<Vec<Vec<[f64; 2]>>> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|position| match position.as_slice() {
                    [x, y, ..] => Ok([*x, *y]),
                    _ => Err(GeohasherError::FormatValidation {
                        format: "GeoJSON".to_string(),
                        reason: format!(
                            "Feature {} has a position with {} coordinates",
                            feature_id,
                            position.len()
                        ),
                    }),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PARCELS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "parcel-1",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                },
                "properties": {"name": "North", "zone": "R1"}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]],
                        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                    ]
                },
                "properties": {"zone": "C2", "area": 12.5, "name": "South"}
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {"name": "Orphan"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let layer = parse_layer(PARCELS, "parcels").unwrap();

        assert_eq!(layer.name, "parcels");
        assert_eq!(layer.fields, vec!["name", "zone", "area"]);
        assert_eq!(layer.features.len(), 3);

        let first = &layer.features[0];
        assert_eq!(first.id, "parcel-1");
        assert_eq!(first.attribute_strings(), vec!["North", "R1", ""]);

        // Attributes follow layer field order, not the feature's own key order
        let second = &layer.features[1];
        assert_eq!(second.id, "1");
        assert_eq!(second.attribute_strings(), vec!["South", "C2", "12.5"]);
        assert_eq!(second.geometry.as_ref().unwrap().parts().len(), 2);

        assert!(!layer.features[2].has_geometry());
    }

    #[test]
    fn test_parse_bare_geometry() {
        let content = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
        let layer = parse_layer(content, "shape").unwrap();

        assert!(layer.fields.is_empty());
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.features[0].id, "0");
    }

    #[test]
    fn test_point_layer_is_rejected() {
        let content = r#"{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [115.26, -8.5]},
            "properties": {}
        }"#;

        let result = parse_layer(content, "points");
        assert!(matches!(
            result,
            Err(GeohasherError::UnsupportedGeometry { ref geometry_type, .. })
                if geometry_type == "Point"
        ));
    }

    #[test]
    fn test_invalid_geojson() {
        let result = parse_layer("{\"type\": \"Nope\"}", "broken");
        assert!(matches!(result, Err(GeohasherError::FormatValidation { .. })));
    }

    #[tokio::test]
    async fn test_reader_reads_file() {
        let reader = GeoJsonReader;
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("parcels.geojson");
        fs::write(&file_path, PARCELS).unwrap();

        let validation = reader.validate(&file_path).await.unwrap();
        assert!(validation.is_valid());

        let layer = reader.read(&file_path).await.unwrap();
        assert_eq!(layer.name, "parcels");
        assert_eq!(layer.features.len(), 3);
    }

    #[tokio::test]
    async fn test_reader_validation_rejects_invalid_json() {
        let reader = GeoJsonReader;
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.geojson");
        fs::write(&file_path, "not valid json").unwrap();

        let validation = reader.validate(&file_path).await.unwrap();
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_supported_extensions() {
        let reader = GeoJsonReader;
        assert_eq!(reader.supported_extensions(), &["geojson", "json"]);
        assert_eq!(reader.format_name(), "GeoJSON");
    }
}
