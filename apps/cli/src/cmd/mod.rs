//! CLI argument parsing and subcommand dispatch.

use crate::config::SavantConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use {ask::Ask, ui::Ui};

pub mod ask;
pub mod config;
pub mod ui;

/// Ask a local Gemma 3 model as a subject-matter expert.
#[derive(Parser, Debug)]
#[command(name = "savant", about = "Ask a local Gemma 3 model as a subject-matter expert")]
pub struct Cli {
    /// Subcommand to execute, the terminal shell when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Checkpoint directory override.
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Maximum number of generated tokens per answer.
    #[arg(long, global = true)]
    pub max_new_tokens: Option<usize>,

    /// Run on the CPU even if an accelerator is available.
    #[arg(long, global = true)]
    pub cpu: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the terminal shell.
    Ui(Ui),
    /// Ask a single question and stream the answer to stdout.
    Ask(Ask),
    /// Inspect the configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Config inspection subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration, flags applied.
    Show,
    /// Print the path of the config file in use.
    Path,
}

impl Cli {
    /// Run the parsed command.
    pub async fn run(self) -> Result<()> {
        match &self.command {
            None | Some(Command::Ui(_)) => {
                crate::logging::init_file(&crate::logging::log_file_path())?;
            }
            Some(_) => crate::logging::init_stderr(),
        }

        let config = self.resolve()?;
        match self.command {
            None => Ui.spawn(config).await,
            Some(Command::Ui(ui)) => ui.spawn(config).await,
            Some(Command::Ask(ask)) => ask.run(config).await,
            Some(Command::Config { action }) => {
                config::run(&action, &config, self.config.as_deref())
            }
        }
    }

    /// Load the config file and apply the flag overrides.
    pub fn resolve(&self) -> Result<SavantConfig> {
        let config = crate::config::resolve_config(self.config.as_deref())?;
        Ok(self.apply(config))
    }

    /// Apply the flag overrides to a loaded config.
    pub fn apply(&self, mut config: SavantConfig) -> SavantConfig {
        if let Some(dir) = &self.model {
            config.model.dir = dir.clone();
        }
        if let Some(max_new_tokens) = self.max_new_tokens {
            config.generation.max_new_tokens = max_new_tokens;
        }
        if self.cpu {
            config.model.cpu = true;
        }
        config
    }
}
