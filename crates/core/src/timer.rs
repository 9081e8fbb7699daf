//! Fire-once poll timer

use std::time::{Duration, Instant};

/// A fire-once timer re-armed by its own callback.
///
/// The shell arms it on submit, fires it from its event loop and re-arms it
/// after every poll that is not done. Time is passed in explicitly so the
/// schedule never depends on a blocking wait.
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    due: Option<Instant>,
}

impl PollTimer {
    /// Create a disarmed timer with a fixed period
    pub fn new(period: Duration) -> Self {
        Self { period, due: None }
    }

    /// Schedule a fire right away
    pub fn arm_now(&mut self, now: Instant) {
        self.due = Some(now);
    }

    /// Schedule a fire one period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.due = Some(now + self.period);
    }

    /// Cancel the pending fire
    pub fn disarm(&mut self) {
        self.due = None;
    }

    /// Whether a fire is pending
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Consume the pending fire if it is due.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending fire, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}
