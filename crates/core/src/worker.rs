//! Single-slot background worker

use anyhow::{Context, Result};
use std::thread::{self, JoinHandle};

/// A reusable slot holding at most one background thread.
///
/// The slot refuses a new task while the previous one is still running and
/// joins finished tasks explicitly, so threads never outlive their owner
/// unnoticed.
#[derive(Debug, Default)]
pub struct Worker {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Create an empty slot whose threads carry `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
        }
    }

    /// Run `task` on a new thread.
    ///
    /// Fails if the slot is still occupied by a running task. A finished
    /// task is joined first.
    pub fn spawn<F>(&mut self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_running() {
            anyhow::bail!("worker {} is still running", self.name);
        }
        self.join();

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(task)
            .with_context(|| format!("failed to spawn worker {}", self.name))?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Whether a task is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Whether the slot holds no unfinished task
    pub fn is_finished(&self) -> bool {
        !self.is_running()
    }

    /// Block until the current task returns, if any.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("worker {} panicked", self.name);
            }
        }
    }

    /// Join the current task only if that does not block.
    ///
    /// Returns `true` once the slot is empty.
    pub fn try_join(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.join();
        true
    }
}
