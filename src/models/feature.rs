//! Point and line features built from table rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geojson::{Feature, Geometry, Position};

/// A project location shown as a marker and a listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    /// Position within the loaded point sequence; reassigned on every load
    pub id: usize,
    pub name: String,
    pub lng: f64,
    pub lat: f64,
    /// Miles from the last geocoder result, if a search happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Raw cell values, carried for display only
    #[serde(rename = "startLat", skip_serializing_if = "Option::is_none")]
    pub start_lat: Option<Value>,
    #[serde(rename = "startLng", skip_serializing_if = "Option::is_none")]
    pub start_lng: Option<Value>,
    #[serde(rename = "endLat", skip_serializing_if = "Option::is_none")]
    pub end_lat: Option<Value>,
    #[serde(rename = "endLng", skip_serializing_if = "Option::is_none")]
    pub end_lng: Option<Value>,
}

impl PointFeature {
    pub fn position(&self) -> Position {
        [self.lng, self.lat]
    }

    pub fn marker_id(&self) -> String {
        format!("marker-{}", self.id)
    }

    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("name".into(), Value::from(self.name.clone()));
        properties.insert("id".into(), Value::from(self.id));
        for (key, value) in [
            ("startLat", &self.start_lat),
            ("startLng", &self.start_lng),
            ("endLat", &self.end_lat),
            ("endLng", &self.end_lng),
        ] {
            if let Some(value) = value {
                properties.insert(key.into(), value.clone());
            }
        }
        if let Some(distance) = self.distance {
            properties.insert("distance".into(), Value::from(distance));
        }

        Feature::new(
            Geometry::Point {
                coordinates: self.position(),
            },
            properties,
        )
    }
}

/// A route drawn as its own line layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    /// Index of the source row (not contiguous with point ids)
    pub id: usize,
    pub name: String,
    pub coordinates: Vec<Position>,
}

impl LineFeature {
    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("name".into(), Value::from(self.name.clone()));
        properties.insert("id".into(), Value::from(self.id));

        Feature::new(
            Geometry::LineString {
                coordinates: self.coordinates.clone(),
            },
            properties,
        )
    }
}
