//! Core data models for the map pipeline.

pub mod feature;
pub mod geojson;
pub mod row;

pub use feature::{LineFeature, PointFeature};
pub use geojson::{Feature, FeatureCollection, Geometry, Position};
pub use row::{fields, Row};
