//! Scripted model adapter for tests.
//!
//! Streams a fixed list of fragments from a real generation thread so the
//! relay, session and shell logic can be exercised without loading weights.

use crate::{CancelToken, Generate, Message, TokenStream};
use anyhow::Result;
use parking_lot::Mutex;
use std::{sync::Arc, thread, time::Duration};

/// A [`Generate`] implementation replaying scripted fragments.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    fragments: Vec<String>,
    failure: Option<String>,
    refusal: Option<String>,
    delay: Duration,
    received: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl Scripted {
    /// Stream `fragments` in order, then end
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Fail with `error` after the last fragment instead of ending
    pub fn fail_with(mut self, error: impl Into<String>) -> Self {
        self.failure = Some(error.into());
        self
    }

    /// Refuse to start at all
    pub fn refuse(mut self, reason: impl Into<String>) -> Self {
        self.refusal = Some(reason.into());
        self
    }

    /// Sleep before every fragment
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The chat turns of every started generation
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().clone()
    }
}

impl Generate for Scripted {
    fn start(&self, messages: &[Message], cancel: CancelToken) -> Result<TokenStream> {
        if let Some(reason) = &self.refusal {
            anyhow::bail!("{reason}");
        }
        self.received.lock().push(messages.to_vec());

        let fragments = self.fragments.clone();
        let failure = self.failure.clone();
        let delay = self.delay;
        TokenStream::spawn("savant-scripted", move |sink| {
            for fragment in fragments {
                thread::sleep(delay);
                if cancel.is_cancelled() || !sink.push(fragment) {
                    return Ok(());
                }
            }

            match failure {
                Some(error) => Err(anyhow::anyhow!(error)),
                None => Ok(()),
            }
        })
    }
}
