//! Parser for the free-text "Coordinates Array" column.

use serde_json::Value;
use tracing::warn;

use crate::models::Position;

/// Parse a JSON array of `[lng, lat]` pairs.
///
/// Anything that is not exactly that shape yields an empty sequence; a
/// partially valid array is never returned.
pub fn parse_coordinates(text: &str) -> Vec<Position> {
    match serde_json::from_str::<Vec<Position>>(text.trim()) {
        Ok(coordinates) => coordinates,
        Err(e) => {
            warn!("Error parsing coordinates: {}", e);
            Vec::new()
        }
    }
}

/// Coordinates from a raw cell value, which may be text or an already
/// decoded JSON array.
pub fn coordinates_from_value(value: &Value) -> Vec<Position> {
    match value {
        Value::String(text) => parse_coordinates(text),
        Value::Array(_) => match serde_json::from_value::<Vec<Position>>(value.clone()) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                warn!("Error parsing coordinates: {}", e);
                Vec::new()
            }
        },
        _ => {
            warn!("Error parsing coordinates: unexpected cell value {}", value);
            Vec::new()
        }
    }
}
