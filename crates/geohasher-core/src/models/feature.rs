use serde::{Deserialize, Serialize};

use super::Geometry;

/// Spatial feature read from a layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identifier (source id, or the input index when absent)
    pub id: String,

    /// Attribute values aligned with the layer's field order
    pub attributes: Vec<serde_json::Value>,

    /// Areal geometry, None when the source feature had no geometry
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(
        id: impl Into<String>,
        attributes: Vec<serde_json::Value>,
        geometry: Geometry,
    ) -> Self {
        Self { id: id.into(), attributes, geometry: Some(geometry) }
    }

    /// Create a new feature without geometry
    pub fn without_geometry(id: impl Into<String>, attributes: Vec<serde_json::Value>) -> Self {
        Self { id: id.into(), attributes, geometry: None }
    }

    /// Check if this feature has geometry
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Render attribute values as output cells
    pub fn attribute_strings(&self) -> Vec<String> {
        self.attributes.iter().map(render_value).collect()
    }
}

/// A layer of features sharing one field list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub fields: Vec<String>,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, fields: Vec<String>, features: Vec<Feature>) -> Self {
        Self { name: name.into(), fields, features }
    }

    /// Header row for output: the field names followed by `geohash`
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.fields.clone();
        headers.push("geohash".to_string());
        headers
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One output line: a feature's attributes plus one covering geohash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub feature_id: String,
    pub attributes: Vec<String>,
    pub geohash: String,
}

impl OutputRow {
    pub fn new(
        feature_id: impl Into<String>,
        attributes: Vec<String>,
        geohash: impl Into<String>,
    ) -> Self {
        Self { feature_id: feature_id.into(), attributes, geohash: geohash.into() }
    }

    /// Values in sink order
    pub fn values(&self) -> Vec<String> {
        let mut values = self.attributes.clone();
        values.push(self.geohash.clone());
        values
    }
}

/// Render a JSON attribute value the way a spreadsheet cell expects it
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
