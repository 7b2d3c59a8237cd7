//! Mapping between screen coordinates and table-local coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Where the table sits on screen.
///
/// The host measures the table once after layout and hands the result to
/// the gesture interpreter. Screen points are converted by subtracting the
/// table's on-screen origin and dividing by the display scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Screen position of the table's top-left corner.
    pub origin: Point,
    /// Screen pixels per table unit.
    pub scale: f64,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl TableLayout {
    /// Layout measured at `origin`, drawn at 1:1 scale.
    pub fn measured(origin: Point) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Layout with a display scale. Non-positive scales fall back to 1.
    pub fn with_scale(origin: Point, scale: f64) -> Self {
        let scale = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
        Self { origin, scale }
    }

    /// Transform from table-local to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::scale(self.scale)
    }

    /// Transform from screen to table-local coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.origin.to_vec2())
    }

    pub fn screen_to_table(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn table_to_screen(&self, table_point: Point) -> Point {
        self.transform() * table_point
    }

    /// Convert a screen-space movement into table units.
    pub fn screen_delta_to_table(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }
}
