//! Projmap - project map data pipeline
//!
//! This library provides the shared types and modules for the `proxy` and
//! `snapshot` binaries: the Airtable client, the row-to-GeoJSON transform,
//! the feature store and the listing synchronizer.

pub mod airtable;
pub mod config;
pub mod geodesy;
pub mod listing;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod session;
pub mod source;

pub use models::{FeatureCollection, LineFeature, PointFeature, Position, Row};
pub use session::{FeatureStore, LoadOutcome, LoadReport, Session};
