//! The expertise/question pair submitted by the user

use crate::Message;

/// Prefix of the system turn, completed with the expertise.
pub const SYSTEM_PREFIX: &str = "You are a helpful assistant who is an expert in the study of";

/// A single submission from the shell.
///
/// Built fresh for every submit and consumed once by [`Prompt::messages`].
/// Blank questions are not rejected; the model receives an empty user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    expertise: String,
    question: String,
}

impl Prompt {
    /// Create a prompt, trimming the surrounding whitespace of the question.
    pub fn new(expertise: impl Into<String>, question: impl AsRef<str>) -> Self {
        Self {
            expertise: expertise.into(),
            question: question.as_ref().trim().to_owned(),
        }
    }

    /// The topic the assistant is asked to be an expert in
    pub fn expertise(&self) -> &str {
        &self.expertise
    }

    /// The question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The two chat turns: the system instruction then the user question.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(format!("{SYSTEM_PREFIX} {}", self.expertise)),
            Message::user(self.question.clone()),
        ]
    }
}
