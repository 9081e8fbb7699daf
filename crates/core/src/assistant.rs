//! Shell-side controller tying the form, the session and the poll timer.
//!
//! The shell owns one [`Assistant`] and drives it from its event loop: key
//! presses become [`Assistant::submit`] and [`Assistant::reset`], and every
//! loop iteration calls [`Assistant::tick`], which polls the relay when the
//! timer fires and re-arms the timer until the stream is done.

use crate::{Form, Generate, Phase, PollTimer, Session, ShellConfig, SubmitError, relay::Poll};
use std::time::{Duration, Instant};

/// What the shell shows in its status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Waiting for a question
    Ready,
    /// An answer is streaming in
    Generating,
    /// The last answer finished
    Done,
    /// The last answer failed
    Failed(String),
}

/// Form state plus the live submission.
pub struct Assistant<G: Generate> {
    form: Form,
    session: Session<G>,
    timer: PollTimer,
    status: Status,
}

impl<G: Generate> Assistant<G> {
    /// Create a controller around a loaded adapter
    pub fn new(generator: G, config: ShellConfig) -> Self {
        Self {
            form: Form::default(),
            session: Session::new(generator),
            timer: PollTimer::new(config.poll_interval()),
            status: Status::Ready,
        }
    }

    /// The form
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The form, for editing the inputs
    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// The status line
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The phase of the latest submission
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// The session
    pub fn session(&self) -> &Session<G> {
        &self.session
    }

    /// Submit the current inputs.
    ///
    /// Clears the response, disables submit and arms the poll timer for an
    /// immediate first poll.
    pub fn submit(&mut self, now: Instant) -> Result<(), SubmitError> {
        if !self.form.can_submit() || self.session.is_busy() {
            return Err(SubmitError::Busy);
        }

        let prompt = self.form.prompt();
        self.form.clear_response();
        self.form.set_submit_enabled(false);

        match self.session.submit(&prompt) {
            Ok(()) => {
                self.status = Status::Generating;
                self.timer.arm_now(now);
                Ok(())
            }
            Err(e) => {
                tracing::error!("{e}");
                self.form.set_submit_enabled(true);
                self.status = Status::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the timer callback if it is due.
    ///
    /// Returns the poll when one happened. The timer is re-armed one period
    /// later unless the poll consumed the terminal entry.
    pub fn tick(&mut self, now: Instant) -> Option<Poll> {
        self.session.reap();
        if !self.timer.fire(now) {
            return None;
        }

        let poll = self.session.poll();
        for fragment in &poll.fragments {
            self.form.append(fragment);
        }

        if poll.done {
            self.form.set_submit_enabled(true);
            self.status = match &poll.error {
                Some(error) => Status::Failed(error.clone()),
                None => Status::Done,
            };
        } else {
            self.timer.arm(now);
        }

        Some(poll)
    }

    /// Clear every field and enable submit, cancelling a live generation.
    pub fn reset(&mut self) {
        self.session.cancel();
        self.timer.disarm();
        self.form.reset();
        self.status = Status::Ready;
    }

    /// Time until the timer wants the next tick, `None` when idle.
    pub fn next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    /// Cancel everything and join every background thread.
    pub fn shutdown(&mut self) {
        self.timer.disarm();
        self.session.shutdown();
    }
}
