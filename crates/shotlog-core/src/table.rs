//! Table geometry: rails, play area and clamping.

use crate::editor::Mode;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Fixed dimensions of the table image and its rails.
///
/// All measurements are in table-local units (the table's top-left corner
/// is the origin). A ball center may never come closer to an edge than
/// `rail + ball_radius`, so the ball's visual edge never crosses the rail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableGeometry {
    /// Full table width including rails.
    pub width: f64,
    /// Full table height including rails.
    pub height: f64,
    /// Rail thickness on the left and right edges.
    pub rail_x: f64,
    /// Rail thickness on the top and bottom edges.
    pub rail_y: f64,
    /// Radius of every ball.
    pub ball_radius: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 600.0,
            rail_x: 35.0,
            rail_y: 75.0,
            ball_radius: 12.0,
        }
    }
}

impl TableGeometry {
    /// The whole table rectangle, rails included.
    pub fn table_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// The cloth inside the rails.
    pub fn play_area(&self) -> Rect {
        Rect::new(
            self.rail_x,
            self.rail_y,
            self.width - self.rail_x,
            self.height - self.rail_y,
        )
    }

    /// The region a ball center may occupy.
    pub fn center_bounds(&self) -> Rect {
        let r = self.ball_radius;
        Rect::new(
            self.rail_x + r,
            self.rail_y + r,
            self.width - self.rail_x - r,
            self.height - self.rail_y - r,
        )
    }

    /// Minimum distance between two ball centers before they overlap.
    pub fn ball_diameter(&self) -> f64 {
        self.ball_radius * 2.0
    }

    /// Constrain a ball center to the nearest in-bounds position.
    pub fn clamp(&self, point: Point) -> Point {
        let bounds = self.center_bounds();
        Point::new(
            point.x.max(bounds.x0).min(bounds.x1),
            point.y.max(bounds.y0).min(bounds.y1),
        )
    }

    /// Constrain an annotation point to the table rectangle.
    pub fn clamp_to_table(&self, point: Point) -> Point {
        Point::new(
            point.x.max(0.0).min(self.width),
            point.y.max(0.0).min(self.height),
        )
    }

    /// Check whether a ball center satisfies the rail invariant.
    pub fn is_in_bounds(&self, point: Point) -> bool {
        let bounds = self.center_bounds();
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }

    /// Check whether a point lies anywhere on the table, rails included.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Default position for a newly added ball.
    ///
    /// In move mode balls appear a quarter of the way down the table; in
    /// draw mode they start at the bottom-left corner of the cloth.
    pub fn spawn_point(&self, mode: Mode) -> Point {
        let raw = match mode {
            Mode::Move => Point::new(self.width / 2.0, self.height / 4.0),
            Mode::Draw => Point::new(
                self.rail_x + self.ball_radius,
                self.height - self.rail_y - self.ball_radius,
            ),
        };
        self.clamp(raw)
    }

    /// Check that a ball fits between the rails on both axes.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(format!(
                "table size must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.ball_radius <= 0.0 || self.rail_x < 0.0 || self.rail_y < 0.0 {
            return Err("ball radius must be positive and rails non-negative".to_string());
        }
        let bounds = self.center_bounds();
        if bounds.x0 > bounds.x1 || bounds.y0 > bounds.y1 {
            return Err(format!(
                "play area {}x{} is too small for balls of radius {}",
                self.play_area().width(),
                self.play_area().height(),
                self.ball_radius
            ));
        }
        Ok(())
    }
}
