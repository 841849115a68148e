use serde_json::{json, Map, Value};
use tracing::warn;

use super::{rows_from_payload, DataSource, FetchError};
use crate::models::{fields, Row};

/// Project locations shipped with the map before the table existed:
/// (name, longitude, latitude)
const BUILTIN_PROJECTS: &[(&str, f64, f64)] = &[
    ("miami-dade-county-dtpw", -80.479192, 25.447817),
    ("miami-dade-county-dtpw", -80.313703, 25.685031),
    ("toledo-blade-boulevard-reconstruction", -82.162697, 27.006778),
    ("toledo-blade-boulevard-reconstruction", -82.163617, 27.018169),
    ("project-development-and-environment-pd-e-study", -80.280169, 27.125589),
    ("project-development-and-environment-pd-e-study", -80.296353, 27.161411),
];

/// Rows held in memory, either given directly or converted from GeoJSON
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<Row>,
}

impl StaticSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// The hard-coded project points
    pub fn builtin() -> Self {
        let rows = BUILTIN_PROJECTS
            .iter()
            .map(|(name, lng, lat)| point_row(Some(json!(name)), *lng, *lat))
            .collect();
        Self { rows }
    }

    /// Parse either a GeoJSON FeatureCollection or a table payload
    pub fn from_json_str(text: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(text)?;
        if value.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
            Self::from_geojson(&value)
        } else {
            Ok(Self::new(rows_from_payload(value)?))
        }
    }

    /// Convert a FeatureCollection into rows: points become start
    /// coordinates, line strings become the coordinates array.
    pub fn from_geojson(collection: &Value) -> Result<Self, FetchError> {
        let features = collection
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Payload("missing `features` array".to_string()))?;

        let mut rows = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            let name = feature
                .pointer("/properties/name")
                .filter(|v| !v.is_null())
                .cloned();
            let geometry_type = feature.pointer("/geometry/type").and_then(Value::as_str);
            let coordinates = feature.pointer("/geometry/coordinates");

            match (geometry_type, coordinates) {
                (Some("Point"), Some(Value::Array(pair))) => {
                    match (
                        pair.first().and_then(Value::as_f64),
                        pair.get(1).and_then(Value::as_f64),
                    ) {
                        (Some(lng), Some(lat)) => rows.push(point_row(name, lng, lat)),
                        _ => warn!("Feature {} has an invalid point, skipping", index),
                    }
                }
                (Some("LineString"), Some(line)) => {
                    let mut row = Row::new(Map::new());
                    if let Some(name) = name {
                        row.insert(fields::NAME, name);
                    }
                    row.insert(fields::COORDINATES_ARRAY, line.clone());
                    rows.push(row);
                }
                (other, _) => warn!("Feature {} has unsupported geometry {:?}, skipping", index, other),
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

fn point_row(name: Option<Value>, lng: f64, lat: f64) -> Row {
    let mut row = Row::new(Map::new());
    if let Some(name) = name {
        row.insert(fields::NAME, name);
    }
    row.insert(fields::START_LATITUDE, json!(lat));
    row.insert(fields::START_LONGITUDE, json!(lng));
    row
}

impl DataSource for StaticSource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
        Ok(self.rows.clone())
    }
}
