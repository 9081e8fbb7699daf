//! One-shot question command.

use crate::config::SavantConfig;
use anyhow::Result;
use clap::Args;
use savant_candle::Gemma3;
use savant_core::{Entry, Prompt, Submission};
use std::io::Write;

/// Ask a single question and stream the answer to stdout.
#[derive(Args, Debug)]
pub struct Ask {
    /// What the assistant should be an expert in.
    #[arg(long, short)]
    pub expertise: String,

    /// The question, joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl Ask {
    /// The prompt for the parsed arguments
    pub fn prompt(&self) -> Prompt {
        Prompt::new(self.expertise.clone(), self.question.join(" "))
    }

    /// Load the model and print the answer as it streams in.
    pub async fn run(self, config: SavantConfig) -> Result<()> {
        let SavantConfig {
            model, generation, ..
        } = config;
        let gemma =
            tokio::task::spawn_blocking(move || Gemma3::load(&model, generation)).await??;

        let submission = Submission::start(&gemma, &self.prompt())?;
        let mut stdout = std::io::stdout();
        stream_to_terminal(submission, &mut stdout).await
    }
}

/// How streaming an answer stopped.
enum Finish {
    End,
    Failed(String),
    Interrupted,
}

/// Write relay entries to `out` as they arrive.
///
/// Handles Ctrl+C cancellation via `tokio::signal::ctrl_c()`. A failed
/// generation is returned as an error after the partial answer.
pub async fn stream_to_terminal(mut submission: Submission, out: &mut impl Write) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let finish = loop {
        tokio::select! {
            entry = submission.recv() => match entry {
                Some(Entry::Fragment(text)) => {
                    write!(out, "{text}")?;
                    out.flush().ok();
                }
                Some(Entry::Failed(error)) => break Finish::Failed(error),
                Some(Entry::End) | None => break Finish::End,
            },
            _ = &mut ctrl_c => break Finish::Interrupted,
        }
    };
    writeln!(out)?;

    match finish {
        Finish::End => {
            submission.join();
            Ok(())
        }
        Finish::Failed(error) => {
            submission.join();
            anyhow::bail!("{error}")
        }
        Finish::Interrupted => {
            tracing::warn!("interrupted, cancelling generation");
            let mut relay = submission.cancel();
            tokio::task::spawn_blocking(move || relay.join()).await?;
            Ok(())
        }
    }
}
