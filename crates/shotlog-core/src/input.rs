//! Raw pointer events and per-pointer tracking for touch input.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Identifier the host assigns to a finger or mouse pointer.
pub type PointerId = u64;

/// Stage of a pointer's touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The host interrupted the sequence.
    Cancel,
}

/// A single pointer callback from the host, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, phase: PointerPhase, position: Point, time: Instant) -> Self {
        Self {
            pointer,
            phase,
            position,
            time,
        }
    }

    pub fn down(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Down, position, time)
    }

    pub fn moved(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Move, position, time)
    }

    pub fn up(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Up, position, time)
    }

    pub fn cancel(pointer: PointerId, position: Point, time: Instant) -> Self {
        Self::new(pointer, PointerPhase::Cancel, position, time)
    }
}

/// Tracks every pressed pointer across events.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Latest screen position of each pressed pointer.
    active: HashMap<PointerId, Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event. Up and cancel forget the pointer.
    pub fn handle_event(&mut self, event: &PointerEvent) {
        match event.phase {
            PointerPhase::Down => {
                self.active.insert(event.pointer, event.position);
            }
            PointerPhase::Move => {
                if let Some(position) = self.active.get_mut(&event.pointer) {
                    *position = event.position;
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.active.remove(&event.pointer);
            }
        }
    }

    /// Number of pointers currently down.
    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn is_pressed(&self, pointer: PointerId) -> bool {
        self.active.contains_key(&pointer)
    }

    /// Latest screen position of a pressed pointer.
    pub fn position(&self, pointer: PointerId) -> Option<Point> {
        self.active.get(&pointer).copied()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
