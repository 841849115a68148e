//! Maps one table row to at most one point and at most one line.

use serde_json::Value;
use tracing::debug;

use super::coordinates::coordinates_from_value;
use crate::models::{fields, LineFeature, PointFeature, Row};

/// Result of transforming a single row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    pub point: Option<PointFeature>,
    pub line: Option<LineFeature>,
}

/// Transform the row at `index` (0-based position in the upstream order).
///
/// The point id is provisional; the store re-indexes points after
/// filtering. The line id is the row index and stays as is.
pub fn transform_row(row: &Row, index: usize) -> Transformed {
    let name = row.truthy(fields::NAME).map(display_text);

    Transformed {
        point: point_from_row(row, index, name.as_deref()),
        line: line_from_row(row, index, name.as_deref()),
    }
}

fn point_from_row(row: &Row, index: usize, name: Option<&str>) -> Option<PointFeature> {
    let start_lat = row.truthy(fields::START_LATITUDE)?;
    let start_lng = row.truthy(fields::START_LONGITUDE)?;

    let (Some(lat), Some(lng)) = (decimal_from_value(start_lat), decimal_from_value(start_lng))
    else {
        debug!(
            "Row {} has unparseable start coordinates ({}, {}), skipping point",
            index, start_lat, start_lng
        );
        return None;
    };

    Some(PointFeature {
        id: index,
        name: name.map_or_else(|| format!("project-{}", index), String::from),
        lng,
        lat,
        distance: None,
        start_lat: Some(start_lat.clone()),
        start_lng: Some(start_lng.clone()),
        end_lat: row.get(fields::END_LATITUDE).cloned(),
        end_lng: row.get(fields::END_LONGITUDE).cloned(),
    })
}

fn line_from_row(row: &Row, index: usize, name: Option<&str>) -> Option<LineFeature> {
    let raw = row.truthy(fields::COORDINATES_ARRAY)?;
    let coordinates = coordinates_from_value(raw);
    if coordinates.is_empty() {
        return None;
    }

    Some(LineFeature {
        id: index,
        name: name.map_or_else(|| format!("route-{}", index), String::from),
        coordinates,
    })
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // 1.0 is shown as "1", like the page's own string conversion
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}

fn decimal_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Locale-independent parse of the leading decimal number in `text`.
///
/// Leading whitespace is skipped and trailing garbage ignored, so
/// `"27.5 N"` parses as `27.5`. Returns `None` when no digits lead.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().ok()
}
