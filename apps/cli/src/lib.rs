//! Savant CLI application: a terminal form for asking a local Gemma 3 model
//! as a subject-matter expert, plus a one-shot `ask` command.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod logging;
pub mod shell;
