//! Cancelable one-shot timer used for long-press detection.

use crate::input::Instant;
use std::time::Duration;

/// A single schedulable deadline.
///
/// The host asks for [`TimerSlot::deadline`] to schedule its own callback and
/// reports back through [`TimerSlot::take_expired`]. Firing disarms the slot
/// and cancelling clears it, so a callback that arrives after the sequence
/// was resolved finds nothing armed and does nothing.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true if the deadline has passed.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
