use serde::Serialize;
use tracing::debug;

use super::{Flight, LineLayer, MapRenderer, Marker};
use crate::models::{FeatureCollection, Position};

/// Every call made against the renderer, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    SetPointSource { source_id: String, features: usize },
    AddLineLayer { layer_id: String },
    RemoveLayer { layer_id: String },
    ClearMarkers,
    PlaceMarker { marker_id: String },
    HighlightMarker { marker_id: String },
    FlyTo(Flight),
    ClosePopups,
    OpenPopup { at: Position },
}

/// In-memory renderer that records commands and keeps the resulting map
/// state.
#[derive(Debug, Default, Serialize)]
pub struct RecordingRenderer {
    pub commands: Vec<RenderCommand>,
    pub point_source: Option<FeatureCollection>,
    pub layers: Vec<LineLayer>,
    pub markers: Vec<Marker>,
    pub active_marker: Option<String>,
    pub popups: Vec<Position>,
    pub camera: Option<Flight>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    fn record(&mut self, command: RenderCommand) {
        debug!("render: {:?}", command);
        self.commands.push(command);
    }
}

impl MapRenderer for RecordingRenderer {
    fn set_point_source(&mut self, source_id: &str, data: &FeatureCollection) {
        self.record(RenderCommand::SetPointSource {
            source_id: source_id.to_string(),
            features: data.len(),
        });
        self.point_source = Some(data.clone());
    }

    fn add_line_layer(&mut self, layer: LineLayer) {
        self.record(RenderCommand::AddLineLayer {
            layer_id: layer.id.clone(),
        });
        self.layers.retain(|l| l.id != layer.id);
        self.layers.push(layer);
    }

    fn remove_layer(&mut self, layer_id: &str) {
        self.record(RenderCommand::RemoveLayer {
            layer_id: layer_id.to_string(),
        });
        self.layers.retain(|l| l.id != layer_id);
    }

    fn clear_markers(&mut self) {
        self.record(RenderCommand::ClearMarkers);
        self.markers.clear();
        self.active_marker = None;
    }

    fn place_marker(&mut self, marker: Marker) {
        self.record(RenderCommand::PlaceMarker {
            marker_id: marker.id.clone(),
        });
        self.markers.push(marker);
    }

    fn highlight_marker(&mut self, marker_id: &str) {
        self.record(RenderCommand::HighlightMarker {
            marker_id: marker_id.to_string(),
        });
        self.active_marker = Some(marker_id.to_string());
    }

    fn fly_to(&mut self, flight: Flight) {
        self.record(RenderCommand::FlyTo(flight));
        self.camera = Some(flight);
    }

    fn close_popups(&mut self) {
        self.record(RenderCommand::ClosePopups);
        self.popups.clear();
    }

    fn open_popup(&mut self, at: Position) {
        self.record(RenderCommand::OpenPopup { at });
        self.popups.push(at);
    }
}
