//! Table editor state: the single source of truth for balls, selection and paths.

use crate::ball::{is_valid_number, Ball, BallId, BallStyle, MAX_BALL_NUMBER};
use crate::collision;
use crate::path::PathAnnotation;
use crate::table::TableGeometry;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Exclusive editing mode, deciding which gesture the table interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Drag balls around the table.
    #[default]
    Move,
    /// Sketch projected paths for balls.
    Draw,
}

impl Mode {
    /// Switch to the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Move => Mode::Draw,
            Mode::Draw => Mode::Move,
        }
    }
}

/// What selecting the already-selected ball does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// The ball stays selected.
    #[default]
    Replace,
    /// The selection is cleared.
    Toggle,
}

/// Behavior switches for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Push moved balls out of other balls.
    pub collision_avoidance: bool,
    /// Re-selection behavior.
    pub selection_policy: SelectionPolicy,
    /// Finalized paths drop points closer than this to the simplified line.
    /// Zero keeps every point.
    pub path_tolerance: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            collision_avoidance: true,
            selection_policy: SelectionPolicy::Replace,
            path_tolerance: 0.5,
        }
    }
}

/// Reasons a ball could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("Ball {0} is already on the table")]
    AlreadyPlaced(u8),
    #[error("No ball numbered {0}")]
    InvalidNumber(u8),
    #[error("Drop point is outside the table")]
    OutsideTable,
}

/// A ball as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub id: BallId,
    pub number: u8,
    pub position: Point,
    pub style: BallStyle,
    pub selected: bool,
}

/// Read-only view of the whole table, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table: TableGeometry,
    pub mode: Mode,
    pub balls: Vec<BallSnapshot>,
    pub selected: Option<BallId>,
    /// Finalized paths.
    pub paths: Vec<PathAnnotation>,
    /// Paths still being drawn.
    pub open_paths: Vec<PathAnnotation>,
}

impl TableSnapshot {
    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// An entry in the ball picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerEntry {
    pub number: u8,
    pub style: BallStyle,
    /// False once the ball is on the table.
    pub enabled: bool,
}

/// Owns every ball, the selection and all path annotations.
///
/// All mutations go through this type so that the placement invariants hold
/// at all times: one live ball per number, and every ball center within the
/// rails. Operations on unknown ids are silent no-ops.
#[derive(Debug, Clone)]
pub struct TableEditor {
    table: TableGeometry,
    options: EditorOptions,
    /// Balls in drawing order (back to front).
    balls: Vec<Ball>,
    selected: Option<BallId>,
    paths: HashMap<BallId, PathAnnotation>,
    open_paths: HashMap<BallId, PathAnnotation>,
    mode: Mode,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self::new(TableGeometry::default(), EditorOptions::default())
    }
}

impl TableEditor {
    pub fn new(table: TableGeometry, options: EditorOptions) -> Self {
        Self {
            table,
            options,
            balls: Vec::new(),
            selected: None,
            paths: HashMap::new(),
            open_paths: HashMap::new(),
            mode: Mode::default(),
        }
    }

    pub fn table(&self) -> &TableGeometry {
        &self.table
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Set the editing mode. Leaving draw mode drops any unfinished path.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        if !self.open_paths.is_empty() {
            log::debug!("Abandoning {} open path(s) on mode switch", self.open_paths.len());
            self.open_paths.clear();
        }
        log::debug!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Balls in drawing order.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Check whether a ball with this number is on the table.
    pub fn is_placed(&self, number: u8) -> bool {
        self.balls.iter().any(|b| b.number == number)
    }

    /// Add a ball at the default spawn position for the current mode.
    pub fn add_ball(&mut self, number: u8) -> Result<BallId, PlacementError> {
        self.check_placeable(number)?;
        let preferred = self.table.spawn_point(self.mode);
        let position = if self.options.collision_avoidance {
            collision::nearest_free_spot(&self.table, preferred, &self.other_centers(None))
                .unwrap_or(preferred)
        } else {
            preferred
        };
        Ok(self.insert(number, position))
    }

    /// Add a ball where it was dropped from the picker.
    ///
    /// Drops outside the table are ignored; drops on the rails are pulled
    /// onto the cloth.
    pub fn drop_ball(&mut self, number: u8, point: Point) -> Result<BallId, PlacementError> {
        self.check_placeable(number)?;
        if !self.table.contains(point) {
            log::debug!("Ignoring drop of ball {} outside the table at {:?}", number, point);
            return Err(PlacementError::OutsideTable);
        }
        let position = if self.options.collision_avoidance {
            let others = self.other_centers(None);
            let resolved = collision::resolve(&self.table, point, None, &others);
            if resolved.blocked {
                collision::nearest_free_spot(&self.table, resolved.point, &others)
                    .unwrap_or(resolved.point)
            } else {
                resolved.point
            }
        } else {
            self.table.clamp(point)
        };
        Ok(self.insert(number, position))
    }

    fn check_placeable(&self, number: u8) -> Result<(), PlacementError> {
        if !is_valid_number(number) {
            return Err(PlacementError::InvalidNumber(number));
        }
        if self.is_placed(number) {
            log::debug!("Ball {} is already placed", number);
            return Err(PlacementError::AlreadyPlaced(number));
        }
        Ok(())
    }

    fn insert(&mut self, number: u8, position: Point) -> BallId {
        let ball = Ball::new(number, position);
        let id = ball.id;
        log::debug!("Added ball {} ({}) at {:?}", number, id, position);
        self.balls.push(ball);
        id
    }

    /// Centers of every ball except `exclude`.
    fn other_centers(&self, exclude: Option<BallId>) -> Vec<Point> {
        self.balls
            .iter()
            .filter(|b| Some(b.id) != exclude)
            .map(|b| b.position)
            .collect()
    }

    /// Move a ball, returning the position actually stored.
    ///
    /// The requested point is clamped into the rails and, with collision
    /// avoidance enabled, pushed out of other balls. Unknown ids return `None`.
    pub fn move_ball(&mut self, id: BallId, point: Point) -> Option<Point> {
        let index = self.balls.iter().position(|b| b.id == id)?;
        let previous = self.balls[index].position;
        let position = if self.options.collision_avoidance {
            collision::resolve(&self.table, point, Some(previous), &self.other_centers(Some(id))).point
        } else {
            self.table.clamp(point)
        };
        self.balls[index].position = position;
        Some(position)
    }

    /// Put a ball back at a previously committed position.
    ///
    /// Only clamps; used to roll back a cancelled drag.
    pub fn restore_position(&mut self, id: BallId, point: Point) -> Option<Point> {
        let clamped = self.table.clamp(point);
        let ball = self.balls.iter_mut().find(|b| b.id == id)?;
        ball.position = clamped;
        Some(clamped)
    }

    /// Remove a ball along with its paths. Clears the selection if needed.
    pub fn remove_ball(&mut self, id: BallId) -> Option<Ball> {
        let index = self.balls.iter().position(|b| b.id == id)?;
        let ball = self.balls.remove(index);
        self.paths.remove(&id);
        self.open_paths.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("Removed ball {} ({})", ball.number, id);
        Some(ball)
    }

    /// Remove every ball and annotation.
    pub fn reset(&mut self) {
        self.balls.clear();
        self.paths.clear();
        self.open_paths.clear();
        self.selected = None;
        log::debug!("Table reset");
    }

    pub fn selected(&self) -> Option<BallId> {
        self.selected
    }

    pub fn is_selected(&self, id: BallId) -> bool {
        self.selected == Some(id)
    }

    /// Set or clear the selection directly. Unknown ids clear nothing and
    /// select nothing.
    pub fn set_selected(&mut self, id: Option<BallId>) {
        match id {
            Some(id) if self.ball(id).is_none() => {}
            _ => self.selected = id,
        }
    }

    /// Select a ball according to the [`SelectionPolicy`].
    pub fn select(&mut self, id: BallId) -> Option<BallId> {
        if self.ball(id).is_none() {
            return self.selected;
        }
        self.selected = match (self.selected == Some(id), self.options.selection_policy) {
            (true, SelectionPolicy::Toggle) => None,
            _ => Some(id),
        };
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Start a new path for a ball. Only meaningful in draw mode.
    pub fn start_path(&mut self, id: BallId, point: Point) -> bool {
        if self.mode != Mode::Draw {
            return false;
        }
        let Some(ball) = self.ball(id) else {
            return false;
        };
        let path = PathAnnotation::new(id, ball.appearance(), self.table.clamp_to_table(point));
        self.open_paths.insert(id, path);
        true
    }

    /// Add a point to a ball's open path. No-op without an open path.
    pub fn extend_path(&mut self, id: BallId, point: Point) -> bool {
        if self.mode != Mode::Draw {
            return false;
        }
        let point = self.table.clamp_to_table(point);
        match self.open_paths.get_mut(&id) {
            Some(path) => path.add_point(point),
            None => false,
        }
    }

    /// Finish a ball's open path, replacing its previous one.
    ///
    /// Paths with fewer than two points are discarded; longer ones are
    /// simplified with the configured tolerance.
    pub fn finalize_path(&mut self, id: BallId) -> bool {
        let Some(mut path) = self.open_paths.remove(&id) else {
            return false;
        };
        if path.len() < 2 {
            log::debug!("Discarding single-point path for {}", id);
            return false;
        }
        let dropped = path.simplify(self.options.path_tolerance);
        log::debug!(
            "Finalized path for {} with {} points ({} simplified away)",
            id,
            path.len(),
            dropped
        );
        self.paths.insert(id, path);
        true
    }

    /// Drop a ball's open path without touching its finalized one.
    pub fn abandon_path(&mut self, id: BallId) -> bool {
        self.open_paths.remove(&id).is_some()
    }

    pub fn path(&self, id: BallId) -> Option<&PathAnnotation> {
        self.paths.get(&id)
    }

    pub fn open_path(&self, id: BallId) -> Option<&PathAnnotation> {
        self.open_paths.get(&id)
    }

    pub fn has_open_path(&self, id: BallId) -> bool {
        self.open_paths.contains_key(&id)
    }

    /// Find the topmost ball under a point.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<BallId> {
        self.balls
            .iter()
            .rev()
            .find(|b| b.hit_test(point, self.table.ball_radius, tolerance))
            .map(|b| b.id)
    }

    /// Snapshot of the table for rendering or export.
    pub fn snapshot(&self) -> TableSnapshot {
        let ordered = |map: &HashMap<BallId, PathAnnotation>| {
            self.balls
                .iter()
                .filter_map(|b| map.get(&b.id).cloned())
                .collect::<Vec<_>>()
        };
        TableSnapshot {
            table: self.table,
            mode: self.mode,
            balls: self
                .balls
                .iter()
                .map(|b| BallSnapshot {
                    id: b.id,
                    number: b.number,
                    position: b.position,
                    style: b.style(),
                    selected: self.selected == Some(b.id),
                })
                .collect(),
            selected: self.selected,
            paths: ordered(&self.paths),
            open_paths: ordered(&self.open_paths),
        }
    }

    /// Picker entries for every ball in the set, disabled once placed.
    pub fn picker_entries(&self) -> Vec<PickerEntry> {
        (0..=MAX_BALL_NUMBER)
            .map(|number| PickerEntry {
                number,
                style: BallStyle::for_number(number),
                enabled: !self.is_placed(number),
            })
            .collect()
    }
}
