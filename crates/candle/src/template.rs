//! Chat templates

use anyhow::Result;
use savant_core::{Message, Role};

/// Turns chat messages into the prompt text a model was tuned on.
pub trait ChatTemplate {
    /// Tokens that end the model's turn
    const STOP_TOKENS: &'static [&'static str];

    /// Format the conversation, ending with the generation prompt.
    fn format(messages: &[Message]) -> Result<String>;
}

/// Gemma 3 prompt formatter.
///
/// Gemma has no system role: the system content is prepended to the first
/// user turn, separated by a blank line.
#[derive(Default)]
pub struct Gemma3Template {
    output: String,
}

impl Gemma3Template {
    fn emit_begin(&mut self) {
        self.output.push_str("<bos>");
    }

    fn emit_turn(&mut self, role: &str, content: &str) {
        self.output.push_str(&format!(
            "<start_of_turn>{role}\n{content}<end_of_turn>\n"
        ));
    }

    fn emit_complete(&mut self) {
        self.output.push_str("<start_of_turn>model\n");
    }
}

impl ChatTemplate for Gemma3Template {
    const STOP_TOKENS: &'static [&'static str] = &["<end_of_turn>", "<eos>"];

    fn format(messages: &[Message]) -> Result<String> {
        let (system, turns) = match messages.split_first() {
            Some((first, rest)) if first.role == Role::System => (Some(first), rest),
            _ => (None, messages),
        };

        let mut formatter = Gemma3Template::default();
        formatter.emit_begin();
        for (index, message) in turns.iter().enumerate() {
            let expected = if index % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            anyhow::ensure!(
                message.role == expected,
                "conversation roles must alternate user/assistant, got {} at turn {index}",
                message.role
            );

            match (index, system) {
                (0, Some(system)) => {
                    let content = format!("{}\n\n{}", system.content, message.content.trim());
                    formatter.emit_turn("user", &content);
                }
                _ if message.role == Role::User => {
                    formatter.emit_turn("user", message.content.trim())
                }
                _ => formatter.emit_turn("model", message.content.trim()),
            }
        }

        anyhow::ensure!(
            turns.last().is_some_and(|m| m.role == Role::User),
            "conversation must end with a user turn"
        );
        formatter.emit_complete();
        Ok(formatter.output)
    }
}
