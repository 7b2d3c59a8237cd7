//! Soft collision avoidance between balls.
//!
//! This is positional correction only: a ball that would overlap another is
//! pushed out along the line joining the two centers. Nothing is integrated
//! over time, every call starts from the requested position.

use crate::table::TableGeometry;
use kurbo::{Point, Vec2};

/// Number of separation sweeps over the other balls before giving up.
const MAX_PASSES: usize = 4;

/// Slack for floating point comparisons of center distances.
pub const SEPARATION_EPSILON: f64 = 1e-6;

/// Result of resolving a candidate position against the other balls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// The position to store.
    pub point: Point,
    /// Whether the candidate was pushed away from another ball.
    pub adjusted: bool,
    /// Whether no free position was found and the previous one was kept.
    pub blocked: bool,
}

impl CollisionResult {
    fn free(point: Point, adjusted: bool) -> Self {
        Self {
            point,
            adjusted,
            blocked: false,
        }
    }
}

/// Check whether two ball centers are closer than `min_distance`.
pub fn overlaps(a: Point, b: Point, min_distance: f64) -> bool {
    (a - b).hypot() < min_distance - SEPARATION_EPSILON
}

/// Resolve a move of one ball against the centers of all other balls.
///
/// The candidate is clamped into the table first. Each overlapping ball
/// pushes the candidate out by the full overlap along the center-to-center
/// vector, after which the point is clamped again. If the candidate still
/// overlaps after a few sweeps, `previous` is returned instead (when known).
pub fn resolve(
    table: &TableGeometry,
    candidate: Point,
    previous: Option<Point>,
    others: &[Point],
) -> CollisionResult {
    let min_distance = table.ball_diameter();
    let mut point = table.clamp(candidate);
    let travel = previous.map(|p| candidate - p).unwrap_or(Vec2::ZERO);
    let mut adjusted = false;

    for _ in 0..MAX_PASSES {
        let mut moved = false;
        for &other in others {
            let delta = point - other;
            let distance = delta.hypot();
            if distance >= min_distance - SEPARATION_EPSILON {
                continue;
            }
            let normal = if distance > SEPARATION_EPSILON {
                delta / distance
            } else {
                fallback_normal(travel)
            };
            point = table.clamp(point + normal * (min_distance - distance));
            moved = true;
            adjusted = true;
        }
        if !moved {
            return CollisionResult::free(point, adjusted);
        }
    }

    if others.iter().all(|&other| !overlaps(point, other, min_distance)) {
        return CollisionResult::free(point, adjusted);
    }

    match previous {
        Some(previous) => CollisionResult {
            point: previous,
            adjusted: true,
            blocked: true,
        },
        None => CollisionResult {
            point,
            adjusted,
            blocked: true,
        },
    }
}

/// Direction to push when two centers coincide: back the way the ball came.
fn fallback_normal(travel: Vec2) -> Vec2 {
    let length = travel.hypot();
    if length > SEPARATION_EPSILON {
        -travel / length
    } else {
        Vec2::new(1.0, 0.0)
    }
}

/// Find the free position closest to `preferred`.
///
/// Candidates are laid out on a grid spaced one diameter apart and visited
/// ring by ring around the preferred point. Returns `None` when every
/// candidate overlaps another ball.
pub fn nearest_free_spot(table: &TableGeometry, preferred: Point, others: &[Point]) -> Option<Point> {
    let min_distance = table.ball_diameter();
    let is_free = |p: Point| others.iter().all(|&other| !overlaps(p, other, min_distance));

    let start = table.clamp(preferred);
    if is_free(start) {
        return Some(start);
    }

    let bounds = table.center_bounds();
    let step = min_distance;
    let rings = ((bounds.width().max(bounds.height()) / step).ceil() as i64).max(1);

    for ring in 1..=rings {
        let mut best: Option<(f64, Point)> = None;
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let raw = Point::new(start.x + dx as f64 * step, start.y + dy as f64 * step);
                if !table.is_in_bounds(raw) || !is_free(raw) {
                    continue;
                }
                let distance = (raw - start).hypot2();
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, raw));
                }
            }
        }
        if let Some((_, point)) = best {
            return Some(point);
        }
    }
    None
}
