//! Submission lifecycle: one generation, one relay, one channel.

use crate::{
    CancelToken, Generate, Prompt, Worker,
    relay::{self, Entry, Poll, RelayReceiver},
};
use anyhow::Result;

/// Where a submission is in its lifecycle.
///
/// `Idle -> Streaming -> Draining -> Complete`; `Complete` holds until the
/// next submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has been submitted yet
    Idle,
    /// The relay is still pulling from the generation
    Streaming,
    /// The relay returned, the remaining entries wait to be polled
    Draining,
    /// The terminal entry was consumed
    Complete,
}

/// Why a submission was refused.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Another submission has not reached `Complete`
    #[error("a generation is already in progress")]
    Busy,
    /// The adapter refused to start
    #[error("failed to start generation: {0:#}")]
    Start(anyhow::Error),
}

/// The request context of a single submission.
///
/// Owns the relay channel's receiving half, the cancel token shared with the
/// generation, and the relay thread.
#[derive(Debug)]
pub struct Submission {
    receiver: RelayReceiver,
    cancel: CancelToken,
    relay: Worker,
}

impl Submission {
    /// Start generating for `prompt` and relay the stream on a new thread.
    pub fn start<G: Generate + ?Sized>(generator: &G, prompt: &Prompt) -> Result<Self> {
        let cancel = CancelToken::new();
        let messages = prompt.messages();
        for message in &messages {
            tracing::trace!("{message}");
        }
        let stream = generator.start(&messages, cancel.clone())?;

        let (sender, receiver) = relay::channel();
        let mut relay = Worker::new("savant-relay");
        relay.spawn(move || {
            let outcome = relay::run_relay(stream, sender);
            tracing::debug!(?outcome, "relay returned");
        })?;

        Ok(Self {
            receiver,
            cancel,
            relay,
        })
    }

    /// The current phase of this submission
    pub fn phase(&self) -> Phase {
        if self.receiver.is_closed() {
            Phase::Complete
        } else if self.relay.is_finished() {
            Phase::Draining
        } else {
            Phase::Streaming
        }
    }

    /// Poll the relay channel without blocking.
    ///
    /// The relay thread is joined once the terminal entry is consumed; by
    /// then it has already pushed its last entry.
    pub fn poll(&mut self) -> Poll {
        let poll = self.receiver.poll();
        if poll.done {
            self.relay.join();
        }
        poll
    }

    /// Wait for the next relay entry, see [`RelayReceiver::recv`].
    pub async fn recv(&mut self) -> Option<Entry> {
        self.receiver.recv().await
    }

    /// Cancel the generation and drop the channel.
    ///
    /// Returns the relay slot so the caller can join it later.
    pub fn cancel(self) -> Worker {
        self.cancel.cancel();
        drop(self.receiver);
        self.relay
    }

    /// Block until the relay thread has returned.
    pub fn join(mut self) {
        self.relay.join();
    }
}

/// Owns the model adapter and the one live submission.
pub struct Session<G: Generate> {
    generator: G,
    current: Option<Submission>,
    retired: Vec<Worker>,
}

impl<G: Generate> Session<G> {
    /// Create a session around a loaded adapter
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            current: None,
            retired: Vec::new(),
        }
    }

    /// The phase of the latest submission
    pub fn phase(&self) -> Phase {
        self.current.as_ref().map_or(Phase::Idle, Submission::phase)
    }

    /// Whether a submission is still streaming or draining
    pub fn is_busy(&self) -> bool {
        matches!(self.phase(), Phase::Streaming | Phase::Draining)
    }

    /// Number of cancelled relays not yet joined
    pub fn retired(&self) -> usize {
        self.retired.len()
    }

    /// Start a new submission, refusing while another one is live.
    pub fn submit(&mut self, prompt: &Prompt) -> Result<(), SubmitError> {
        if self.is_busy() {
            return Err(SubmitError::Busy);
        }

        if let Some(previous) = self.current.take() {
            previous.join();
        }

        tracing::info!(
            expertise = prompt.expertise(),
            question_len = prompt.question().len(),
            "starting generation"
        );
        let submission = Submission::start(&self.generator, prompt).map_err(SubmitError::Start)?;
        self.current = Some(submission);
        Ok(())
    }

    /// Poll the live submission.
    ///
    /// Without one, the poll is empty and done.
    pub fn poll(&mut self) -> Poll {
        match self.current.as_mut() {
            Some(submission) => submission.poll(),
            None => Poll {
                done: true,
                ..Default::default()
            },
        }
    }

    /// Cancel the live submission, if any.
    ///
    /// The relay is retired rather than joined, see [`Session::reap`].
    pub fn cancel(&mut self) -> bool {
        if !self.is_busy() {
            return false;
        }

        match self.current.take() {
            Some(submission) => {
                tracing::warn!("cancelling in-flight generation");
                self.retired.push(submission.cancel());
                true
            }
            None => false,
        }
    }

    /// Join the retired relays that have already returned.
    pub fn reap(&mut self) {
        self.retired.retain_mut(|worker| !worker.try_join());
    }

    /// Cancel everything and wait for every thread to return.
    pub fn shutdown(&mut self) {
        self.cancel();
        if let Some(submission) = self.current.take() {
            submission.join();
        }
        for mut worker in self.retired.drain(..) {
            worker.join();
        }
    }
}

impl<G: Generate> Drop for Session<G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
