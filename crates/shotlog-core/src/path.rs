//! Projected shot paths drawn for a ball.

use crate::ball::{BallAppearance, BallId};
use kurbo::{Line, ParamCurveNearest, Point};
use serde::{Deserialize, Serialize};

/// Points closer than this to the previous point are dropped while drawing.
pub const MIN_POINT_SPACING: f64 = 1.0;

/// A drawn trajectory belonging to one ball.
///
/// The annotation keeps a snapshot of the ball's appearance taken when the
/// path was started, so it renders in the ball's color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAnnotation {
    pub(crate) ball_id: BallId,
    /// Appearance of the originating ball.
    pub origin: BallAppearance,
    /// Points of the path in table-local coordinates.
    pub points: Vec<Point>,
}

impl PathAnnotation {
    /// Start a path at `start`.
    pub fn new(ball_id: BallId, origin: BallAppearance, start: Point) -> Self {
        Self {
            ball_id,
            origin,
            points: vec![start],
        }
    }

    pub fn ball_id(&self) -> BallId {
        self.ball_id
    }

    /// Append a point, skipping jitter closer than [`MIN_POINT_SPACING`].
    /// Returns true if the point was kept.
    pub fn add_point(&mut self, point: Point) -> bool {
        let keep = self
            .points
            .last()
            .is_none_or(|last| (point - *last).hypot() >= MIN_POINT_SPACING);
        if keep {
            self.points.push(point);
        }
        keep
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The start-to-end segment of the path.
    pub fn segment(&self) -> Option<Line> {
        match (self.points.first(), self.points.last()) {
            (Some(&start), Some(&end)) if self.points.len() >= 2 => Some(Line::new(start, end)),
            _ => None,
        }
    }

    /// Drop interior points that stay within `tolerance` of the chord
    /// spanning their neighbours that were kept. Returns how many points
    /// were removed.
    pub fn simplify(&mut self, tolerance: f64) -> usize {
        let count = self.points.len();
        if count < 3 || tolerance <= 0.0 {
            return 0;
        }

        let mut keep = vec![false; count];
        keep[0] = true;
        keep[count - 1] = true;
        let mut spans = vec![(0, count - 1)];
        while let Some((from, to)) = spans.pop() {
            let chord = Line::new(self.points[from], self.points[to]);
            let farthest = (from + 1..to)
                .map(|i| (i, chord.nearest(self.points[i], 1e-9).distance_sq))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((index, distance_sq)) = farthest {
                if distance_sq > tolerance * tolerance {
                    keep[index] = true;
                    spans.push((from, index));
                    spans.push((index, to));
                }
            }
        }

        let mut flags = keep.into_iter();
        self.points.retain(|_| flags.next().unwrap_or(true));
        count - self.points.len()
    }
}
