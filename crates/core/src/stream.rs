//! Blocking token streams produced by a model adapter

use crate::Message;
use anyhow::{Context, Result};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
};

/// A model adapter able to start a generation.
///
/// `start` must return as soon as the generation thread is running; it is
/// called from the shell thread and may not wait for the first token.
pub trait Generate: Send + Sync + 'static {
    /// Start generating an answer for the chat turns.
    fn start(&self, messages: &[Message], cancel: CancelToken) -> Result<TokenStream>;
}

/// Cooperative cancellation flag shared with the generation thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new, unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The producing half of a [`TokenStream`], owned by the generation thread.
pub struct TokenSink {
    tx: mpsc::Sender<Result<String>>,
}

impl TokenSink {
    /// Push a decoded fragment.
    ///
    /// Returns `false` once the stream has been dropped, in which case the
    /// generation should stop.
    pub fn push(&self, fragment: impl Into<String>) -> bool {
        self.tx.send(Ok(fragment.into())).is_ok()
    }
}

/// A live, pull-based sequence of generated text fragments.
///
/// Iterating blocks until the next fragment is decoded. The stream ends when
/// the generation thread returns; that thread is joined before `None` is
/// yielded, so an exhausted stream never leaves a thread behind.
pub struct TokenStream {
    rx: Option<mpsc::Receiver<Result<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl TokenStream {
    /// Run `generate` on a new named thread and stream what it pushes.
    ///
    /// An error returned by `generate` is yielded as the last item.
    pub fn spawn<F>(name: &str, generate: F) -> Result<Self>
    where
        F: FnOnce(TokenSink) -> Result<()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let sink = TokenSink { tx: tx.clone() };
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                if let Err(e) = generate(sink) {
                    tracing::warn!("generation failed: {e:#}");
                    let _ = tx.send(Err(e));
                }
            })
            .with_context(|| format!("failed to spawn thread {name}"))?;

        Ok(Self {
            rx: Some(rx),
            handle: Some(handle),
        })
    }

    /// Join the generation thread, surfacing a panic as an error.
    fn join(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("generation thread panicked")),
            None => Ok(()),
        }
    }
}

impl Iterator for TokenStream {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                self.rx = None;
                self.join().err().map(Err)
            }
        }
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        // the receiver goes first so a running generation sees the hang-up
        self.rx.take();
        if let Err(e) = self.join() {
            tracing::error!("{e}");
        }
    }
}
