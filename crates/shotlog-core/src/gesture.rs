//! Gesture interpretation: turns pointer sequences into editor operations.
//!
//! Each touch sequence starts out pending. Releasing quickly without moving
//! is a tap (or a double tap on the same ball), moving past the slop or
//! holding past the long-press threshold starts a drag. In draw mode the drag
//! sketches a path instead of moving the ball, and a second finger can draw
//! a path for the selected ball while the first one rests.

use crate::ball::BallId;
use crate::editor::{Mode, PlacementError, TableEditor};
use crate::input::{Instant, PointerEvent, PointerId, PointerPhase, PointerTracker};
use crate::layout::TableLayout;
use crate::timer::TimerSlot;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Differences below this are treated as "the editor stored what we asked for".
const REBASE_EPSILON: f64 = 1e-9;

/// Thresholds and switches for gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a press turns into a drag.
    pub long_press_ms: u64,
    /// Maximum gap between two taps on the same ball to count as a double tap.
    pub double_tap_ms: u64,
    /// Movement (screen pixels) a press may make and still be a tap.
    pub tap_slop: f64,
    /// Extra reach around a ball when hit-testing a press.
    pub hit_tolerance: f64,
    /// Only a long press can start a drag; moving early abandons the sequence.
    pub drag_requires_long_press: bool,
    /// Allow the two-finger path gesture in draw mode.
    pub two_finger_draw: bool,
    /// Put a ball back where it was when its drag is cancelled.
    pub rollback_on_cancel: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 250,
            double_tap_ms: 300,
            tap_slop: 3.0,
            hit_tolerance: 4.0,
            drag_requires_long_press: false,
            two_finger_draw: true,
            rollback_on_cancel: true,
        }
    }
}

impl GestureConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }
}

/// A recognised gesture, reported back to the host after it was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A ball was tapped and selected.
    SingleTap(BallId),
    /// A ball was tapped twice in quick succession and removed.
    DoubleTap(BallId),
    DragStarted(BallId),
    DragMoved { ball: BallId, position: Point },
    /// The drag was released; `position` is the committed one.
    DragEnded { ball: BallId, position: Point },
    PathStarted(BallId),
    /// A path gesture ended. `kept` is false if the path was too short.
    PathFinished { ball: BallId, kept: bool },
    /// A picker entry was tapped.
    PickerTap {
        number: u8,
        result: Result<BallId, PlacementError>,
    },
    /// A picker entry was held long enough to be dragged.
    PickerDragStarted(u8),
    /// A dragged picker entry was released.
    Dropped {
        number: u8,
        result: Result<BallId, PlacementError>,
    },
    /// The sequence was interrupted.
    Cancelled,
}

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PressTarget {
    Ball(BallId),
    /// Empty cloth, only tracked in draw mode with a selected ball.
    Table,
    Picker(u8),
}

/// Interpretation state of the current touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    Pending {
        pointer: PointerId,
        target: PressTarget,
        press: Point,
    },
    Dragging {
        pointer: PointerId,
        ball: BallId,
        /// Ball position the current delta is applied to.
        start: Point,
        /// Screen point the current delta is measured from.
        anchor: Point,
        /// Committed position before the drag, for rollback.
        origin: Point,
    },
    Drawing {
        pointer: PointerId,
        ball: BallId,
    },
    TwoFinger {
        anchor: PointerId,
        draw: PointerId,
        ball: BallId,
    },
    PickerDragging {
        pointer: PointerId,
        number: u8,
    },
    /// The sequence does nothing until its pointer lifts.
    Ignored {
        pointer: PointerId,
    },
}

impl Phase {
    fn owns(&self, pointer: PointerId) -> bool {
        match *self {
            Phase::Idle => false,
            Phase::Pending { pointer: p, .. }
            | Phase::Dragging { pointer: p, .. }
            | Phase::Drawing { pointer: p, .. }
            | Phase::PickerDragging { pointer: p, .. }
            | Phase::Ignored { pointer: p } => p == pointer,
            Phase::TwoFinger { anchor, draw, .. } => pointer == anchor || pointer == draw,
        }
    }
}

/// Classifies pointer streams and applies the result to a [`TableEditor`].
///
/// The interpreter holds no copy of the table, only scratch data for the
/// sequence in progress, discarded when the sequence ends.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    layout: TableLayout,
    phase: Phase,
    pointers: PointerTracker,
    long_press: TimerSlot,
    /// Last single tap, for double-tap detection.
    last_tap: Option<(BallId, Instant)>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig, layout: TableLayout) -> Self {
        Self {
            config,
            layout,
            phase: Phase::Idle,
            pointers: PointerTracker::new(),
            long_press: TimerSlot::new(),
            last_tap: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Replace the table layout after the host re-measured it.
    pub fn relayout(&mut self, layout: TableLayout) {
        self.layout = layout;
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Number of pointers currently pressed.
    pub fn active_pointers(&self) -> usize {
        self.pointers.count()
    }

    /// When the host should call [`GestureInterpreter::fire_timers`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.long_press.deadline()
    }

    /// Process a pointer event that landed on the table.
    pub fn handle_event(&mut self, event: PointerEvent, editor: &mut TableEditor) -> Option<Gesture> {
        self.dispatch(event, None, editor)
    }

    /// Process a pointer event that started on a picker entry.
    ///
    /// Later events of the same sequence may go through either entry point.
    pub fn handle_picker_event(
        &mut self,
        number: u8,
        event: PointerEvent,
        editor: &mut TableEditor,
    ) -> Option<Gesture> {
        self.dispatch(event, Some(number), editor)
    }

    fn dispatch(
        &mut self,
        event: PointerEvent,
        picker: Option<u8>,
        editor: &mut TableEditor,
    ) -> Option<Gesture> {
        self.pointers.handle_event(&event);
        match event.phase {
            PointerPhase::Down => self.on_down(event, picker, editor),
            PointerPhase::Move => self.on_move(event, editor),
            PointerPhase::Up => self.on_up(event, editor),
            PointerPhase::Cancel => {
                if self.phase.owns(event.pointer) {
                    self.abort(editor)
                } else {
                    None
                }
            }
        }
    }

    /// Run the long-press timer if its deadline has passed.
    ///
    /// Calling this with nothing armed, or before the deadline, is a no-op.
    pub fn fire_timers(&mut self, now: Instant, editor: &mut TableEditor) -> Option<Gesture> {
        if !self.long_press.take_expired(now) {
            return None;
        }
        let Phase::Pending { pointer, target, press } = self.phase else {
            return None;
        };
        let current = self.pointers.position(pointer).unwrap_or(press);
        self.promote_long_press(pointer, target, press, current, editor)
    }

    /// Interrupt whatever is in progress, e.g. when the host steals the touch.
    pub fn cancel(&mut self, editor: &mut TableEditor) -> Option<Gesture> {
        self.pointers.clear();
        self.abort(editor)
    }

    fn on_down(
        &mut self,
        event: PointerEvent,
        picker: Option<u8>,
        editor: &mut TableEditor,
    ) -> Option<Gesture> {
        if self.phase != Phase::Idle {
            return if picker.is_none() {
                self.on_secondary_down(event, editor)
            } else {
                None
            };
        }

        let pointer = event.pointer;
        let target = match picker {
            Some(number) if editor.is_placed(number) => None,
            Some(number) => Some(PressTarget::Picker(number)),
            None => {
                let point = self.layout.screen_to_table(event.position);
                match editor.hit_test(point, self.config.hit_tolerance) {
                    Some(id) => Some(PressTarget::Ball(id)),
                    None if editor.mode() == Mode::Draw && editor.selected().is_some() => {
                        Some(PressTarget::Table)
                    }
                    None => None,
                }
            }
        };

        match target {
            Some(target) => {
                self.phase = Phase::Pending {
                    pointer,
                    target,
                    press: event.position,
                };
                self.long_press.arm(event.time, self.config.long_press());
            }
            None => self.phase = Phase::Ignored { pointer },
        }
        None
    }

    /// A second finger while the first is down: two-finger path draw.
    fn on_secondary_down(&mut self, event: PointerEvent, editor: &mut TableEditor) -> Option<Gesture> {
        if !self.config.two_finger_draw || editor.mode() != Mode::Draw {
            return None;
        }
        let (anchor, pressed) = match self.phase {
            Phase::Pending { pointer, target, .. } => (pointer, Some(target)),
            Phase::Drawing { pointer, ball } => {
                editor.abandon_path(ball);
                (pointer, Some(PressTarget::Ball(ball)))
            }
            _ => return None,
        };
        let ball = match pressed {
            Some(PressTarget::Ball(id)) => Some(id),
            _ => editor.selected(),
        };
        self.long_press.cancel();

        let start = self.layout.screen_to_table(event.position);
        match ball.filter(|&id| editor.start_path(id, start)) {
            Some(ball) => {
                editor.set_selected(Some(ball));
                self.phase = Phase::TwoFinger {
                    anchor,
                    draw: event.pointer,
                    ball,
                };
                log::debug!("Two-finger path draw for {}", ball);
                Some(Gesture::PathStarted(ball))
            }
            None => {
                self.phase = Phase::Ignored { pointer: anchor };
                None
            }
        }
    }

    fn on_move(&mut self, event: PointerEvent, editor: &mut TableEditor) -> Option<Gesture> {
        match self.phase {
            Phase::Pending { pointer, target, press } if pointer == event.pointer => {
                if (event.position - press).hypot() <= self.config.tap_slop {
                    return None;
                }
                self.long_press.cancel();
                let needs_long_press =
                    self.config.drag_requires_long_press || matches!(target, PressTarget::Picker(_));
                if needs_long_press {
                    log::debug!("Pointer {} moved before long press, ignoring sequence", pointer);
                    self.phase = Phase::Ignored { pointer };
                    return None;
                }
                self.begin_drag(pointer, target, press, event.position, editor)
            }
            Phase::Dragging { pointer, ball, .. } if pointer == event.pointer => self
                .drag_to(event.position, editor)
                .map(|position| Gesture::DragMoved { ball, position }),
            Phase::Drawing { pointer, ball } if pointer == event.pointer => {
                editor.extend_path(ball, self.layout.screen_to_table(event.position));
                None
            }
            Phase::TwoFinger { draw, ball, .. } if draw == event.pointer => {
                editor.extend_path(ball, self.layout.screen_to_table(event.position));
                None
            }
            _ => None,
        }
    }

    fn on_up(&mut self, event: PointerEvent, editor: &mut TableEditor) -> Option<Gesture> {
        let released = event.pointer;
        match self.phase {
            Phase::Pending { pointer, target, press } if pointer == released => {
                if self.long_press.take_expired(event.time) {
                    // Held past the threshold but the host never fired the timer.
                    self.promote_long_press(pointer, target, press, event.position, editor);
                    return self.on_up(event, editor);
                }
                self.long_press.cancel();
                self.phase = Phase::Idle;
                match target {
                    PressTarget::Ball(id) => self.classify_tap(id, event.time, editor),
                    PressTarget::Table => None,
                    PressTarget::Picker(number) => Some(Gesture::PickerTap {
                        number,
                        result: editor.add_ball(number),
                    }),
                }
            }
            Phase::Dragging { pointer, ball, .. } if pointer == released => {
                let committed = self.drag_to(event.position, editor);
                self.phase = Phase::Idle;
                let position = committed?;
                log::debug!("Drag of {} committed at {:?}", ball, position);
                Some(Gesture::DragEnded { ball, position })
            }
            Phase::Drawing { pointer, ball } if pointer == released => {
                editor.extend_path(ball, self.layout.screen_to_table(event.position));
                self.phase = Phase::Idle;
                Some(Gesture::PathFinished {
                    ball,
                    kept: editor.finalize_path(ball),
                })
            }
            Phase::TwoFinger { anchor, draw, ball } if released == anchor || released == draw => {
                if released == draw {
                    editor.extend_path(ball, self.layout.screen_to_table(event.position));
                }
                let remaining = if released == anchor { draw } else { anchor };
                self.phase = Phase::Ignored { pointer: remaining };
                Some(Gesture::PathFinished {
                    ball,
                    kept: editor.finalize_path(ball),
                })
            }
            Phase::PickerDragging { pointer, number } if pointer == released => {
                self.phase = Phase::Idle;
                let point = self.layout.screen_to_table(event.position);
                let result = editor.drop_ball(number, point);
                if let Err(err) = result {
                    log::debug!("Drop of ball {} ignored: {}", number, err);
                }
                Some(Gesture::Dropped { number, result })
            }
            Phase::Ignored { pointer } if pointer == released => {
                self.phase = Phase::Idle;
                None
            }
            _ => None,
        }
    }

    /// The press was held past the long-press threshold.
    fn promote_long_press(
        &mut self,
        pointer: PointerId,
        target: PressTarget,
        press: Point,
        current: Point,
        editor: &mut TableEditor,
    ) -> Option<Gesture> {
        match target {
            PressTarget::Picker(number) if editor.is_placed(number) => {
                self.phase = Phase::Ignored { pointer };
                None
            }
            PressTarget::Picker(number) => {
                self.phase = Phase::PickerDragging { pointer, number };
                Some(Gesture::PickerDragStarted(number))
            }
            _ => self.begin_drag(pointer, target, press, current, editor),
        }
    }

    fn begin_drag(
        &mut self,
        pointer: PointerId,
        target: PressTarget,
        press: Point,
        current: Point,
        editor: &mut TableEditor,
    ) -> Option<Gesture> {
        // A drag breaks any tap sequence in progress.
        self.last_tap = None;

        match editor.mode() {
            Mode::Move => {
                let ball = match target {
                    PressTarget::Ball(id) => id,
                    _ => {
                        self.phase = Phase::Ignored { pointer };
                        return None;
                    }
                };
                let Some(origin) = editor.ball(ball).map(|b| b.position) else {
                    self.phase = Phase::Ignored { pointer };
                    return None;
                };
                editor.set_selected(Some(ball));
                self.phase = Phase::Dragging {
                    pointer,
                    ball,
                    start: origin,
                    anchor: press,
                    origin,
                };
                log::debug!("Drag started for {} at {:?}", ball, origin);
                self.drag_to(current, editor);
                Some(Gesture::DragStarted(ball))
            }
            Mode::Draw => {
                let candidate = match target {
                    PressTarget::Ball(id) => Some(id),
                    PressTarget::Table => editor.selected(),
                    PressTarget::Picker(_) => None,
                };
                let start = self.layout.screen_to_table(press);
                let Some(ball) = candidate.filter(|&id| editor.start_path(id, start)) else {
                    self.phase = Phase::Ignored { pointer };
                    return None;
                };
                editor.set_selected(Some(ball));
                editor.extend_path(ball, self.layout.screen_to_table(current));
                self.phase = Phase::Drawing { pointer, ball };
                log::debug!("Path draw started for {}", ball);
                Some(Gesture::PathStarted(ball))
            }
        }
    }

    /// Move the dragged ball to follow the pointer. Returns the stored position.
    ///
    /// When the editor stores something other than what was asked (a rail or
    /// another ball was in the way), the drag is re-based on that axis so
    /// that moving back responds immediately.
    fn drag_to(&mut self, position: Point, editor: &mut TableEditor) -> Option<Point> {
        let Phase::Dragging {
            pointer,
            ball,
            mut start,
            mut anchor,
            origin,
        } = self.phase
        else {
            return None;
        };

        let target = start + self.layout.screen_delta_to_table(position - anchor);
        let Some(stored) = editor.move_ball(ball, target) else {
            log::debug!("Ball {} disappeared during drag", ball);
            self.phase = Phase::Ignored { pointer };
            return None;
        };

        if (stored.x - target.x).abs() > REBASE_EPSILON {
            start.x = stored.x;
            anchor.x = position.x;
        }
        if (stored.y - target.y).abs() > REBASE_EPSILON {
            start.y = stored.y;
            anchor.y = position.y;
        }
        self.phase = Phase::Dragging {
            pointer,
            ball,
            start,
            anchor,
            origin,
        };
        Some(stored)
    }

    fn classify_tap(&mut self, id: BallId, now: Instant, editor: &mut TableEditor) -> Option<Gesture> {
        if editor.ball(id).is_none() {
            self.last_tap = None;
            return None;
        }
        let window = self.config.double_tap_window();
        let is_double = matches!(
            self.last_tap,
            Some((last, at)) if last == id && now.saturating_duration_since(at) <= window
        );
        if is_double {
            self.last_tap = None;
            editor.remove_ball(id);
            log::debug!("Double tap removed {}", id);
            Some(Gesture::DoubleTap(id))
        } else {
            self.last_tap = Some((id, now));
            editor.select(id);
            Some(Gesture::SingleTap(id))
        }
    }

    /// End the current sequence without committing it.
    fn abort(&mut self, editor: &mut TableEditor) -> Option<Gesture> {
        self.long_press.cancel();
        match std::mem::take(&mut self.phase) {
            Phase::Idle => return None,
            Phase::Dragging { ball, origin, .. } => {
                if self.config.rollback_on_cancel {
                    editor.restore_position(ball, origin);
                    log::debug!("Drag of {} cancelled, rolled back to {:?}", ball, origin);
                }
            }
            Phase::Drawing { ball, .. } | Phase::TwoFinger { ball, .. } => {
                editor.abandon_path(ball);
            }
            Phase::Pending { .. } | Phase::PickerDragging { .. } | Phase::Ignored { .. } => {}
        }
        Some(Gesture::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableGeometry;

    const ORIGIN: Point = Point::new(20.0, 100.0);

    struct Harness {
        editor: TableEditor,
        gestures: GestureInterpreter,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(GestureConfig::default())
        }

        fn with_config(config: GestureConfig) -> Self {
            Self {
                editor: TableEditor::default(),
                gestures: GestureInterpreter::new(config, TableLayout::measured(ORIGIN)),
                t0: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        /// Screen position of a table-local point.
        fn screen(x: f64, y: f64) -> Point {
            Point::new(x + ORIGIN.x, y + ORIGIN.y)
        }

        fn send(&mut self, phase: PointerPhase, pointer: PointerId, x: f64, y: f64, ms: u64) -> Option<Gesture> {
            let event = PointerEvent::new(pointer, phase, Self::screen(x, y), self.at(ms));
            self.gestures.handle_event(event, &mut self.editor)
        }

        fn down(&mut self, x: f64, y: f64, ms: u64) -> Option<Gesture> {
            self.send(PointerPhase::Down, 1, x, y, ms)
        }

        fn moved(&mut self, x: f64, y: f64, ms: u64) -> Option<Gesture> {
            self.send(PointerPhase::Move, 1, x, y, ms)
        }

        fn up(&mut self, x: f64, y: f64, ms: u64) -> Option<Gesture> {
            self.send(PointerPhase::Up, 1, x, y, ms)
        }

        fn tap(&mut self, x: f64, y: f64, ms: u64) -> Option<Gesture> {
            self.down(x, y, ms);
            self.up(x, y, ms + 40)
        }

        fn fire(&mut self, ms: u64) -> Option<Gesture> {
            let now = self.at(ms);
            self.gestures.fire_timers(now, &mut self.editor)
        }

        fn picker(&mut self, number: u8, phase: PointerPhase, screen: Point, ms: u64) -> Option<Gesture> {
            let event = PointerEvent::new(9, phase, screen, self.at(ms));
            self.gestures.handle_picker_event(number, event, &mut self.editor)
        }

        fn position(&self, id: BallId) -> Point {
            self.editor.ball(id).unwrap().position
        }
    }

    #[test]
    fn test_tap_selects() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        assert_eq!(h.tap(150.0, 150.0, 0), Some(Gesture::SingleTap(id)));
        assert_eq!(h.editor.selected(), Some(id));
        assert!(h.gestures.is_idle());
        assert_eq!(h.gestures.next_deadline(), None);
    }

    #[test]
    fn test_double_tap_removes() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        assert_eq!(h.tap(150.0, 150.0, 0), Some(Gesture::SingleTap(id)));
        assert_eq!(h.tap(151.0, 150.0, 200), Some(Gesture::DoubleTap(id)));
        assert!(!h.editor.is_placed(1));
        assert_eq!(h.editor.selected(), None);
    }

    #[test]
    fn test_slow_taps_stay_single() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        assert_eq!(h.tap(150.0, 150.0, 0), Some(Gesture::SingleTap(id)));
        assert_eq!(h.tap(150.0, 150.0, 500), Some(Gesture::SingleTap(id)));
        assert!(h.editor.is_placed(1));
    }

    #[test]
    fn test_taps_on_different_balls_are_not_double() {
        let mut h = Harness::new();
        let a = h.editor.drop_ball(1, Point::new(100.0, 200.0)).unwrap();
        let b = h.editor.drop_ball(2, Point::new(200.0, 200.0)).unwrap();

        assert_eq!(h.tap(100.0, 200.0, 0), Some(Gesture::SingleTap(a)));
        assert_eq!(h.tap(200.0, 200.0, 100), Some(Gesture::SingleTap(b)));
        assert_eq!(h.editor.len(), 2);
    }

    #[test]
    fn test_press_on_empty_cloth_does_nothing() {
        let mut h = Harness::new();
        h.editor.add_ball(1).unwrap();

        assert_eq!(h.down(100.0, 400.0, 0), None);
        assert_eq!(h.gestures.next_deadline(), None);
        assert_eq!(h.moved(120.0, 420.0, 10), None);
        assert_eq!(h.up(120.0, 420.0, 20), None);
        assert!(h.gestures.is_idle());
        assert_eq!(h.editor.selected(), None);
    }

    #[test]
    fn test_drag_moves_ball() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert_eq!(h.moved(180.0, 150.0, 16), Some(Gesture::DragStarted(id)));
        assert_eq!(h.position(id), Point::new(180.0, 150.0));
        assert_eq!(h.editor.selected(), Some(id));

        assert_eq!(
            h.moved(200.0, 170.0, 32),
            Some(Gesture::DragMoved { ball: id, position: Point::new(200.0, 170.0) })
        );
        assert_eq!(
            h.up(200.0, 170.0, 48),
            Some(Gesture::DragEnded { ball: id, position: Point::new(200.0, 170.0) })
        );
        assert_eq!(h.position(id), Point::new(200.0, 170.0));
        assert!(h.gestures.is_idle());
    }

    #[test]
    fn test_small_jitter_is_still_a_tap() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert_eq!(h.moved(152.0, 151.0, 10), None);
        assert_eq!(h.up(152.0, 151.0, 30), Some(Gesture::SingleTap(id)));
        assert_eq!(h.position(id), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_drag_clamps_and_rebases() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        h.moved(100.0, 150.0, 10);
        assert_eq!(h.position(id), Point::new(100.0, 150.0));

        h.moved(-100.0, 150.0, 20);
        assert_eq!(h.position(id), Point::new(47.0, 150.0));

        // Coming back responds right away instead of waiting for the pointer
        // to cross the rail again.
        h.moved(-90.0, 150.0, 30);
        assert_eq!(h.position(id), Point::new(57.0, 150.0));
    }

    #[test]
    fn test_every_drag_frame_stays_in_bounds() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();
        let table = *h.editor.table();

        h.down(150.0, 150.0, 0);
        for (i, (x, y)) in [(400.0, -80.0), (-30.0, 900.0), (150.0, 300.0), (999.0, 999.0)]
            .into_iter()
            .enumerate()
        {
            h.moved(x, y, 10 * (i as u64 + 1));
            assert!(table.is_in_bounds(h.position(id)));
        }
    }

    #[test]
    fn test_drag_never_counts_as_tap() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        h.moved(170.0, 160.0, 20);
        h.up(170.0, 160.0, 40);

        // A quick tap right after the drag is only a first tap.
        assert_eq!(h.tap(170.0, 160.0, 80), Some(Gesture::SingleTap(id)));
        assert!(h.editor.is_placed(1));

        assert!(h.editor.remove_ball(id).is_some());
        assert!(!h.editor.is_placed(1));
    }

    #[test]
    fn test_tap_drag_tap_is_not_double() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        assert_eq!(h.tap(150.0, 150.0, 0), Some(Gesture::SingleTap(id)));
        h.down(150.0, 150.0, 60);
        h.moved(160.0, 150.0, 80);
        h.up(160.0, 150.0, 100);
        assert_eq!(h.tap(160.0, 150.0, 150), Some(Gesture::SingleTap(id)));
        assert!(h.editor.is_placed(1));
    }

    #[test]
    fn test_long_press_starts_drag() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert_eq!(h.gestures.next_deadline(), Some(h.at(250)));
        assert_eq!(h.fire(100), None);
        assert_eq!(h.fire(260), Some(Gesture::DragStarted(id)));
        assert!(h.gestures.is_dragging());

        h.moved(150.0, 200.0, 300);
        assert_eq!(
            h.up(150.0, 200.0, 320),
            Some(Gesture::DragEnded { ball: id, position: Point::new(150.0, 200.0) })
        );
    }

    #[test]
    fn test_late_release_without_timer_is_not_a_tap() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert_eq!(
            h.up(150.0, 150.0, 600),
            Some(Gesture::DragEnded { ball: id, position: Point::new(150.0, 150.0) })
        );
    }

    #[test]
    fn test_stale_timer_is_noop() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.tap(150.0, 150.0, 0);
        assert_eq!(h.fire(1000), None);
        assert!(h.gestures.is_idle());
        assert_eq!(h.position(id), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_long_press_required_variant() {
        let mut h = Harness::with_config(GestureConfig {
            drag_requires_long_press: true,
            ..GestureConfig::default()
        });
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert_eq!(h.moved(190.0, 150.0, 50), None);
        assert_eq!(h.up(190.0, 150.0, 80), None);
        assert_eq!(h.position(id), Point::new(150.0, 150.0));

        h.down(150.0, 150.0, 1000);
        assert_eq!(h.fire(1300), Some(Gesture::DragStarted(id)));
        h.moved(190.0, 150.0, 1350);
        assert_eq!(h.position(id), Point::new(190.0, 150.0));
    }

    #[test]
    fn test_cancel_rolls_back() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        h.moved(200.0, 250.0, 20);
        assert_eq!(h.position(id), Point::new(200.0, 250.0));

        assert_eq!(h.send(PointerPhase::Cancel, 1, 200.0, 250.0, 30), Some(Gesture::Cancelled));
        assert_eq!(h.position(id), Point::new(150.0, 150.0));
        assert!(h.gestures.is_idle());
    }

    #[test]
    fn test_cancel_keeps_last_frame_without_rollback() {
        let mut h = Harness::with_config(GestureConfig {
            rollback_on_cancel: false,
            ..GestureConfig::default()
        });
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        h.moved(200.0, 250.0, 20);
        h.gestures.cancel(&mut h.editor);
        assert_eq!(h.position(id), Point::new(200.0, 250.0));
        assert_eq!(h.gestures.active_pointers(), 0);
    }

    #[test]
    fn test_cancel_clears_pending_timer() {
        let mut h = Harness::new();
        h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        assert!(h.gestures.next_deadline().is_some());
        h.send(PointerPhase::Cancel, 1, 150.0, 150.0, 10);
        assert_eq!(h.gestures.next_deadline(), None);
        assert_eq!(h.fire(500), None);
    }

    #[test]
    fn test_ball_removed_mid_drag() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.down(150.0, 150.0, 0);
        h.moved(170.0, 150.0, 10);
        h.editor.remove_ball(id);

        assert_eq!(h.moved(190.0, 150.0, 20), None);
        assert_eq!(h.up(190.0, 150.0, 30), None);
        assert!(h.gestures.is_idle());
        assert!(h.editor.is_empty());
    }

    #[test]
    fn test_draw_mode_single_finger_path() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(3).unwrap();
        h.editor.set_mode(Mode::Draw);

        h.down(150.0, 150.0, 0);
        assert_eq!(h.moved(150.0, 200.0, 20), Some(Gesture::PathStarted(id)));
        h.moved(160.0, 260.0, 40);
        assert_eq!(
            h.up(170.0, 300.0, 60),
            Some(Gesture::PathFinished { ball: id, kept: true })
        );

        let path = h.editor.path(id).unwrap();
        assert_eq!(path.points.first(), Some(&Point::new(150.0, 150.0)));
        assert_eq!(path.points.last(), Some(&Point::new(170.0, 300.0)));
        assert_eq!(path.len(), 4);
        // The ball itself did not move.
        assert_eq!(h.position(id), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_draw_from_empty_cloth_uses_selection() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(3).unwrap();
        h.editor.select(id);
        h.editor.set_mode(Mode::Draw);

        h.down(100.0, 400.0, 0);
        assert_eq!(h.moved(100.0, 450.0, 20), Some(Gesture::PathStarted(id)));
        h.up(100.0, 480.0, 40);
        assert_eq!(h.editor.path(id).unwrap().points[0], Point::new(100.0, 400.0));
    }

    #[test]
    fn test_cancel_abandons_path() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(3).unwrap();
        h.editor.set_mode(Mode::Draw);

        h.down(150.0, 150.0, 0);
        h.moved(150.0, 200.0, 20);
        assert!(h.editor.open_path(id).is_some());
        h.send(PointerPhase::Cancel, 1, 150.0, 200.0, 30);
        assert!(h.editor.open_path(id).is_none());
        assert!(h.editor.path(id).is_none());
    }

    #[test]
    fn test_two_finger_draw() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(3).unwrap();
        h.editor.set_mode(Mode::Draw);

        h.send(PointerPhase::Down, 1, 150.0, 150.0, 0);
        assert_eq!(
            h.send(PointerPhase::Down, 2, 200.0, 300.0, 20),
            Some(Gesture::PathStarted(id))
        );
        assert_eq!(h.editor.selected(), Some(id));
        assert_eq!(h.gestures.next_deadline(), None);

        h.send(PointerPhase::Move, 2, 210.0, 350.0, 40);
        // The resting finger's jitter is ignored.
        h.send(PointerPhase::Move, 1, 160.0, 150.0, 50);
        h.send(PointerPhase::Move, 2, 220.0, 400.0, 60);

        assert_eq!(
            h.send(PointerPhase::Up, 1, 160.0, 150.0, 80),
            Some(Gesture::PathFinished { ball: id, kept: true })
        );
        assert_eq!(h.send(PointerPhase::Move, 2, 230.0, 450.0, 90), None);
        assert_eq!(h.send(PointerPhase::Up, 2, 230.0, 450.0, 100), None);
        assert!(h.gestures.is_idle());

        let path = h.editor.path(id).unwrap();
        assert_eq!(path.points.first(), Some(&Point::new(200.0, 300.0)));
        assert_eq!(path.points.last(), Some(&Point::new(220.0, 400.0)));
        assert_eq!(h.position(id), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_second_finger_ignored_in_move_mode() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(3).unwrap();

        h.send(PointerPhase::Down, 1, 150.0, 150.0, 0);
        assert_eq!(h.send(PointerPhase::Down, 2, 200.0, 300.0, 10), None);
        assert_eq!(h.send(PointerPhase::Up, 2, 200.0, 300.0, 20), None);
        assert_eq!(h.send(PointerPhase::Up, 1, 150.0, 150.0, 30), Some(Gesture::SingleTap(id)));
    }

    #[test]
    fn test_picker_tap_adds_ball() {
        let mut h = Harness::new();
        let below_table = Point::new(100.0, 800.0);

        h.picker(6, PointerPhase::Down, below_table, 0);
        let gesture = h.picker(6, PointerPhase::Up, below_table, 50);
        let Some(Gesture::PickerTap { number: 6, result: Ok(id) }) = gesture else {
            panic!("expected picker tap, got {:?}", gesture);
        };
        assert_eq!(h.position(id), Point::new(150.0, 150.0));

        h.picker(6, PointerPhase::Down, below_table, 100);
        assert_eq!(h.picker(6, PointerPhase::Up, below_table, 150), None);
        assert_eq!(h.editor.len(), 1);
    }

    #[test]
    fn test_picker_long_press_drop() {
        let mut h = Harness::new();
        let below_table = Point::new(100.0, 800.0);

        h.picker(5, PointerPhase::Down, below_table, 0);
        assert_eq!(h.fire(300), Some(Gesture::PickerDragStarted(5)));
        h.picker(5, PointerPhase::Move, Harness::screen(120.0, 300.0), 320);
        let gesture = h.picker(5, PointerPhase::Up, Harness::screen(120.0, 300.0), 340);
        let Some(Gesture::Dropped { number: 5, result: Ok(id) }) = gesture else {
            panic!("expected drop, got {:?}", gesture);
        };
        assert_eq!(h.position(id), Point::new(120.0, 300.0));
    }

    #[test]
    fn test_picker_drop_outside_table_ignored() {
        let mut h = Harness::new();
        let below_table = Point::new(100.0, 800.0);

        h.picker(5, PointerPhase::Down, below_table, 0);
        h.fire(300);
        assert_eq!(
            h.picker(5, PointerPhase::Up, Point::new(100.0, 750.0), 340),
            Some(Gesture::Dropped { number: 5, result: Err(PlacementError::OutsideTable) })
        );
        assert!(!h.editor.is_placed(5));
    }

    #[test]
    fn test_picker_scroll_is_ignored() {
        let mut h = Harness::new();

        h.picker(5, PointerPhase::Down, Point::new(100.0, 800.0), 0);
        assert_eq!(h.picker(5, PointerPhase::Move, Point::new(60.0, 800.0), 30), None);
        assert_eq!(h.fire(300), None);
        assert_eq!(h.picker(5, PointerPhase::Up, Point::new(60.0, 800.0), 350), None);
        assert!(h.editor.is_empty());
    }

    #[test]
    fn test_relayout_changes_translation() {
        let mut h = Harness::new();
        let id = h.editor.add_ball(1).unwrap();

        h.gestures.relayout(TableLayout::measured(Point::ZERO));
        let event = PointerEvent::down(1, Point::new(150.0, 150.0), h.at(0));
        h.gestures.handle_event(event, &mut h.editor);
        let event = PointerEvent::up(1, Point::new(150.0, 150.0), h.at(20));
        assert_eq!(h.gestures.handle_event(event, &mut h.editor), Some(Gesture::SingleTap(id)));
    }

    #[test]
    fn test_geometry_is_respected_with_custom_table() {
        let mut h = Harness::new();
        h.editor = TableEditor::new(
            TableGeometry {
                width: 200.0,
                height: 400.0,
                rail_x: 20.0,
                rail_y: 20.0,
                ball_radius: 10.0,
            },
            Default::default(),
        );
        let id = h.editor.add_ball(1).unwrap();
        let spawn = h.position(id);

        h.down(spawn.x, spawn.y, 0);
        h.moved(spawn.x - 500.0, spawn.y, 10);
        h.up(spawn.x - 500.0, spawn.y, 20);
        assert_eq!(h.position(id).x, 30.0);
    }
}
