//! Terminal shell command.

use crate::{config::SavantConfig, shell::Shell};
use anyhow::Result;
use clap::Args;
use savant_candle::Gemma3;
use savant_core::Assistant;

/// Open the terminal shell.
#[derive(Args, Debug)]
pub struct Ui;

impl Ui {
    /// Run the shell on a blocking thread, off the async runtime.
    pub async fn spawn(self, config: SavantConfig) -> Result<()> {
        tokio::task::spawn_blocking(move || self.run(config)).await?
    }

    /// Load the model, then hand the terminal to the shell until quit.
    pub fn run(self, config: SavantConfig) -> Result<()> {
        eprintln!("loading model from {}", config.model.dir.display());
        let gemma = Gemma3::load(&config.model, config.generation)?;
        let shell = Shell::new(Assistant::new(gemma, config.shell));

        let mut terminal = ratatui::init();
        let result = shell.run(&mut terminal);
        ratatui::restore();
        result
    }
}
