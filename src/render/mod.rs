//! Map renderer capability.
//!
//! The map engine itself lives outside this crate; the session drives it
//! through [`MapRenderer`]. [`RecordingRenderer`] keeps the resulting map
//! state in memory for the headless CLI and for tests.

mod recording;

use serde::Serialize;

use crate::config::RouteStyle;
use crate::models::{Feature, FeatureCollection, Position};

pub use recording::{RecordingRenderer, RenderCommand};

/// Source id of the point collection
pub const PLACES_SOURCE: &str = "places";

/// A camera move
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Flight {
    pub center: Position,
    pub zoom: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// A line layer backed by its own single-feature source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLayer {
    pub id: String,
    pub feature: Feature,
    pub style: RouteStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub position: Position,
}

pub trait MapRenderer {
    /// Create or replace the GeoJSON source `source_id`
    fn set_point_source(&mut self, source_id: &str, data: &FeatureCollection);

    fn add_line_layer(&mut self, layer: LineLayer);

    /// Remove a layer and its source; unknown ids are ignored
    fn remove_layer(&mut self, layer_id: &str);

    fn clear_markers(&mut self);

    fn place_marker(&mut self, marker: Marker);

    /// Show `marker_id` as the active pin and reset every other pin
    fn highlight_marker(&mut self, marker_id: &str);

    fn fly_to(&mut self, flight: Flight);

    fn close_popups(&mut self);

    fn open_popup(&mut self, at: Position);
}
