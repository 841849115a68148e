//! Tabular rows as delivered by the upstream datastore.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names read from each row. These must match the table exactly.
pub mod fields {
    pub const NAME: &str = "Name";
    pub const START_LATITUDE: &str = "Start Latitude";
    pub const START_LONGITUDE: &str = "Start Longitude";
    pub const END_LATITUDE: &str = "End Latitude";
    pub const END_LONGITUDE: &str = "End Longitude";
    pub const COORDINATES_ARRAY: &str = "Coordinates Array";
}

/// One record of the external table: field name → value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Map<String, Value>,
}

impl Row {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value if it is present and truthy.
    ///
    /// Absent, `null`, `false`, `0` and `""` all count as missing, the same
    /// way the table's web frontend treats empty cells.
    pub fn truthy(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| is_truthy(v))
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
