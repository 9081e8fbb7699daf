//! Streaming relay between a blocking token stream and a polling consumer.
//!
//! [`run_relay`] runs on its own thread, pulls fragments from the stream and
//! pushes them into an unbounded FIFO channel, finishing with exactly one
//! terminal entry. [`RelayReceiver::poll`] drains that channel without ever
//! blocking, which is what the shell's timer calls on every tick.
//! [`RelayReceiver::recv`] is the same contract for async callers.

use anyhow::Result;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Reported when the relay disappears without a terminal entry.
const RELAY_LOST: &str = "relay stopped before the end of the stream";

/// One entry in the relay channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A generated text fragment
    Fragment(String),
    /// The stream is exhausted; nothing follows
    End,
    /// Pulling from the stream failed; nothing follows
    Failed(String),
}

impl Entry {
    /// Whether this entry closes the channel
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fragment(_))
    }
}

/// Create a fresh relay channel for one submission.
pub fn channel() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        RelaySender { tx },
        RelayReceiver {
            rx,
            closed: false,
        },
    )
}

/// Producing half of the relay channel.
#[derive(Debug)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<Entry>,
}

impl RelaySender {
    /// Push an entry, returns `false` if the receiver is gone.
    pub fn push(&self, entry: Entry) -> bool {
        self.tx.send(entry).is_ok()
    }
}

/// What the relay did before it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every fragment was relayed and the end marker pushed
    Finished {
        /// Number of fragments relayed
        fragments: usize,
    },
    /// The stream failed and the error marker was pushed
    Failed {
        /// Number of fragments relayed before the failure
        fragments: usize,
    },
    /// The receiver went away and relaying stopped early
    Abandoned,
}

/// Drain `stream` into `sender`.
///
/// Fragments are pushed in the order they are pulled, empty ones skipped.
/// Exhaustion pushes [`Entry::End`] and a pull error pushes
/// [`Entry::Failed`]; exactly one of the two is pushed unless the receiver
/// has been dropped. Nothing is retried.
pub fn run_relay<S>(stream: S, sender: RelaySender) -> Outcome
where
    S: IntoIterator<Item = Result<String>>,
{
    let mut fragments = 0;
    for item in stream {
        match item {
            Ok(fragment) if fragment.is_empty() => continue,
            Ok(fragment) => {
                if !sender.push(Entry::Fragment(fragment)) {
                    tracing::debug!("relay receiver dropped after {fragments} fragments");
                    return Outcome::Abandoned;
                }
                fragments += 1;
            }
            Err(e) => {
                tracing::warn!("token stream failed after {fragments} fragments: {e:#}");
                if !sender.push(Entry::Failed(format!("{e:#}"))) {
                    return Outcome::Abandoned;
                }
                return Outcome::Failed { fragments };
            }
        }
    }

    if !sender.push(Entry::End) {
        return Outcome::Abandoned;
    }
    tracing::debug!("relay finished with {fragments} fragments");
    Outcome::Finished { fragments }
}

/// Result of one non-blocking poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Poll {
    /// Fragments drained by this poll, in emission order
    pub fragments: Vec<String>,

    /// Whether the terminal entry has been consumed
    pub done: bool,

    /// The failure reported by the relay, if the stream failed
    pub error: Option<String>,
}

impl Poll {
    /// The drained fragments joined together
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

/// Consuming half of the relay channel.
#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::UnboundedReceiver<Entry>,
    closed: bool,
}

impl RelayReceiver {
    /// Whether the terminal entry has been consumed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drain everything currently available without blocking.
    ///
    /// Stops at the terminal entry and reports `done`. Once done, every later
    /// poll is empty and still done.
    pub fn poll(&mut self) -> Poll {
        let mut poll = Poll {
            done: self.closed,
            ..Default::default()
        };

        while !self.closed {
            match self.rx.try_recv() {
                Ok(Entry::Fragment(fragment)) => poll.fragments.push(fragment),
                Ok(Entry::End) => {
                    self.close();
                    poll.done = true;
                }
                Ok(Entry::Failed(error)) => {
                    self.close();
                    poll.done = true;
                    poll.error = Some(error);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.close();
                    poll.done = true;
                    poll.error = Some(RELAY_LOST.into());
                }
            }
        }

        poll
    }

    /// Wait for the next entry.
    ///
    /// Returns the terminal entry once, then `None` forever after.
    pub async fn recv(&mut self) -> Option<Entry> {
        if self.closed {
            return None;
        }

        let entry = self
            .rx
            .recv()
            .await
            .unwrap_or_else(|| Entry::Failed(RELAY_LOST.into()));
        if entry.is_terminal() {
            self.close();
        }
        Some(entry)
    }

    fn close(&mut self) {
        self.closed = true;
        self.rx.close();
    }
}
