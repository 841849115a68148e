//! In-memory feature store, rebuilt on every load.

use tracing::debug;

use crate::models::{FeatureCollection, LineFeature, PointFeature, Row};
use crate::pipeline::transform_row;

#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    points: Vec<PointFeature>,
    lines: Vec<LineFeature>,
}

impl FeatureStore {
    /// Transform rows in order and re-index the surviving points so that
    /// `points[i].id == i`.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut points = Vec::new();
        let mut lines = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let out = transform_row(row, index);
            if let Some(point) = out.point {
                points.push(point);
            }
            if let Some(line) = out.line {
                lines.push(line);
            }
        }

        debug!(
            "Transformed {} rows into {} points and {} lines",
            rows.len(),
            points.len(),
            lines.len()
        );
        Self::from_parts(points, lines)
    }

    /// Build a store from already transformed features; point ids are
    /// reassigned by position.
    pub fn from_parts(mut points: Vec<PointFeature>, lines: Vec<LineFeature>) -> Self {
        for (i, point) in points.iter_mut().enumerate() {
            point.id = i;
        }
        Self { points, lines }
    }

    pub fn points(&self) -> &[PointFeature] {
        &self.points
    }

    pub fn lines(&self) -> &[LineFeature] {
        &self.lines
    }

    pub fn point(&self, id: usize) -> Option<&PointFeature> {
        self.points.get(id)
    }

    /// True when there are no points to measure or list
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Overwrite the distance of every point. This is the only in-place
    /// mutation the store allows.
    pub fn set_distances<F>(&mut self, mut miles: F)
    where
        F: FnMut(&PointFeature) -> f64,
    {
        for point in &mut self.points {
            point.distance = Some(miles(point));
        }
    }

    pub fn points_collection(&self) -> FeatureCollection {
        FeatureCollection::new(self.points.iter().map(PointFeature::to_feature).collect())
    }

    pub fn lines_collection(&self) -> FeatureCollection {
        FeatureCollection::new(self.lines.iter().map(LineFeature::to_feature).collect())
    }
}
