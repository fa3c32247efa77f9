use crate::core::models::{ClosedPath, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    pub fn between(source_width: u32, source_height: u32, view_width: f32, view_height: f32) -> Self {
        Self {
            x: source_width as f32 / view_width,
            y: source_height as f32 / view_height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    pub fn apply(&self, path: &ClosedPath) -> ClosedPath {
        path.map_points(|point| Point::new(point.x * self.x, point.y * self.y))
    }
}

pub fn translate(path: &ClosedPath, dx: f32, dy: f32) -> ClosedPath {
    path.map_points(|point| Point::new(point.x + dx, point.y + dy))
}
