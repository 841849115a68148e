//! Map session configuration, read from a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::Position;
use crate::render::Flight;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MapConfig {
    pub data: DataConfig,
    pub view: ViewConfig,
    pub default_region: RegionConfig,
    pub selection: SelectionConfig,
    pub route_style: RouteStyle,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Proxy endpoint serving the project table
    pub projects_endpoint: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            projects_endpoint: "http://localhost:3000/api/projects".to_string(),
        }
    }
}

/// Camera when the map first opens
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ViewConfig {
    pub style: String,
    pub center: Position,
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/cmplxworld/clrb4wlg5006701ns357n1pte".to_string(),
            // Continental US
            center: [-98.5795, 39.8283],
            zoom: 4.0,
        }
    }
}

/// Delayed flight to the region the projects are in
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RegionConfig {
    pub center: Position,
    pub zoom: f64,
    pub speed: f64,
    pub delay_ms: u64,
}

impl RegionConfig {
    pub fn flight(&self) -> Flight {
        Flight {
            center: self.center,
            zoom: self.zoom,
            speed: Some(self.speed),
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            // Florida
            center: [-81.5158, 27.7663],
            zoom: 6.0,
            speed: 0.5,
            delay_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    /// Zoom used when flying to a selected project
    pub zoom: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { zoom: 9.0 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RouteStyle {
    pub color: String,
    pub width: f64,
    pub join: String,
    pub cap: String,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            color: "#ffbd70".to_string(),
            width: 4.0,
            join: "round".to_string(),
            cap: "round".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Search bounds: [minLon, minLat, maxLon, maxLat]
    pub bbox: [f64; 4],
}

impl GeocoderConfig {
    pub fn contains(&self, point: Position) -> bool {
        let [min_lon, min_lat, max_lon, max_lat] = self.bbox;
        (min_lon..=max_lon).contains(&point[0]) && (min_lat..=max_lat).contains(&point[1])
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            bbox: [-124.848974, 24.396308, -66.885444, 49.384358],
        }
    }
}

impl MapConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: MapConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
