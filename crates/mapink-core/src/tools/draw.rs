//! In-progress line capture for the draw tool.

use crate::geo::{LngLat, Shape};

/// Coordinates sampled since the last pointer-down. Local working state only;
/// it is handed off as a line shape on release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    points: Vec<LngLat>,
}

impl GeometryBuffer {
    /// Start a new line at the press coordinate.
    pub fn begin(start: LngLat) -> Self {
        Self { points: vec![start] }
    }

    /// Append one pointer-move sample.
    pub fn push(&mut self, point: LngLat) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[LngLat] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the buffer into the committed line shape.
    pub fn into_shape(self) -> Shape {
        Shape::LineString(self.points)
    }
}
