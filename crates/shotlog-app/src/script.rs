//! Recorded input scripts and their replay through a [`Session`].

use kurbo::Point;
use serde::{Deserialize, Serialize};
use shotlog_core::{
    Gesture, Instant, Mode, PointerEvent, PointerId, PointerPhase, Session, TableLayout,
};
use std::time::Duration;

/// A recorded sequence of host events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Where the table was measured on screen. Defaults to the screen origin.
    #[serde(default)]
    pub layout: TableLayout,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A pointer sample. `at` is milliseconds since the script started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerStep {
    #[serde(default)]
    pub pointer: PointerId,
    pub x: f64,
    pub y: f64,
    pub at: u64,
}

/// A pointer sample on a picker entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickerStep {
    pub number: u8,
    #[serde(default)]
    pub pointer: PointerId,
    pub x: f64,
    pub y: f64,
    pub at: u64,
}

/// One host event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Tap on a picker entry without going through pointer events.
    Add { number: u8 },
    Down(PointerStep),
    Move(PointerStep),
    Up(PointerStep),
    Cancel(PointerStep),
    PickerDown(PickerStep),
    PickerMove(PickerStep),
    PickerUp(PickerStep),
    /// Let time pass, firing any timer that comes due.
    Wait { at: u64 },
    Mode { mode: Mode },
    ToggleMode,
    Save,
    Reset,
}

impl Step {
    /// Script time of the step, if it carries one.
    fn at(&self) -> Option<u64> {
        match self {
            Step::Down(p) | Step::Move(p) | Step::Up(p) | Step::Cancel(p) => Some(p.at),
            Step::PickerDown(p) | Step::PickerMove(p) | Step::PickerUp(p) => Some(p.at),
            Step::Wait { at } => Some(*at),
            _ => None,
        }
    }
}

/// Replays scripts against a session on a simulated clock.
pub struct ScriptRunner {
    session: Session,
    epoch: Instant,
}

impl ScriptRunner {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            epoch: Instant::now(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn time(&self, at: u64) -> Instant {
        self.epoch + Duration::from_millis(at)
    }

    /// Run every step and collect the recognised gestures.
    pub fn run(&mut self, script: &Script) -> Vec<Gesture> {
        self.session.relayout(script.layout);
        let mut gestures = Vec::new();
        for (index, step) in script.steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", index, step);
            gestures.extend(self.step(step));
        }
        gestures
    }

    /// Apply one step. Timers due by the step's time fire first.
    pub fn step(&mut self, step: &Step) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        if let Some(at) = step.at() {
            gestures.extend(self.advance(self.time(at)));
        }

        let gesture = match *step {
            Step::Add { number } => {
                if let Err(e) = self.session.add_ball(number) {
                    log::warn!("Could not add ball {}: {}", number, e);
                }
                None
            }
            Step::Down(p) => self.pointer(PointerPhase::Down, p),
            Step::Move(p) => self.pointer(PointerPhase::Move, p),
            Step::Up(p) => self.pointer(PointerPhase::Up, p),
            Step::Cancel(p) => self.pointer(PointerPhase::Cancel, p),
            Step::PickerDown(p) => self.picker(PointerPhase::Down, p),
            Step::PickerMove(p) => self.picker(PointerPhase::Move, p),
            Step::PickerUp(p) => self.picker(PointerPhase::Up, p),
            Step::Wait { .. } => None,
            Step::Mode { mode } => {
                self.session.set_mode(mode);
                None
            }
            Step::ToggleMode => {
                self.session.toggle_mode();
                None
            }
            Step::Save => {
                self.session.save();
                None
            }
            Step::Reset => {
                self.session.reset();
                None
            }
        };

        if let Some(gesture) = gesture {
            log::info!("{:?}", gesture);
            gestures.push(gesture);
        }
        gestures
    }

    fn advance(&mut self, now: Instant) -> Option<Gesture> {
        let deadline = self.session.next_deadline().filter(|deadline| *deadline <= now)?;
        let gesture = self.session.fire_timers(deadline)?;
        log::info!("{:?}", gesture);
        Some(gesture)
    }

    fn pointer(&mut self, phase: PointerPhase, step: PointerStep) -> Option<Gesture> {
        let event = PointerEvent::new(step.pointer, phase, Point::new(step.x, step.y), self.time(step.at));
        self.session.pointer(event)
    }

    fn picker(&mut self, phase: PointerPhase, step: PickerStep) -> Option<Gesture> {
        let event = PointerEvent::new(step.pointer, phase, Point::new(step.x, step.y), self.time(step.at));
        self.session.picker_pointer(step.number, event)
    }
}
