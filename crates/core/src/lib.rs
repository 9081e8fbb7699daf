//! Core of the Savant assistant: prompts, the streaming relay and the
//! submission lifecycle shared by every shell.

pub use {
    assistant::{Assistant, Status},
    config::{GenerationConfig, ShellConfig},
    form::Form,
    message::{Message, Role},
    prompt::{Prompt, SYSTEM_PREFIX},
    relay::{Entry, Poll, RelayReceiver, RelaySender},
    session::{Phase, Session, Submission, SubmitError},
    stream::{CancelToken, Generate, TokenSink, TokenStream},
    timer::PollTimer,
    worker::Worker,
};

mod assistant;
mod config;
mod form;
mod message;
mod prompt;
pub mod relay;
mod session;
mod stream;
mod timer;
mod worker;

#[cfg(feature = "testing")]
pub mod testing;
