//! The three shell fields and the submit control

use crate::Prompt;

/// Contents of the shell: two inputs, the response and the submit state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// What the assistant should be an expert in
    pub expertise: String,

    /// The question, possibly spanning several lines
    pub question: String,

    /// The append-only response area
    response: String,

    /// Whether the submit control is enabled
    submit_enabled: bool,
}

impl Form {
    /// The prompt for the current inputs
    pub fn prompt(&self) -> Prompt {
        Prompt::new(self.expertise.clone(), &self.question)
    }

    /// The response received so far
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Append a fragment to the response
    pub fn append(&mut self, fragment: &str) {
        self.response.push_str(fragment);
    }

    /// Clear the response area
    pub fn clear_response(&mut self) {
        self.response.clear();
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.submit_enabled
    }

    /// Enable or disable the submit control
    pub fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    /// Clear every field and enable submit.
    pub fn reset(&mut self) {
        self.expertise.clear();
        self.question.clear();
        self.response.clear();
        self.submit_enabled = true;
    }
}

impl Default for Form {
    fn default() -> Self {
        Self {
            expertise: String::new(),
            question: String::new(),
            response: String::new(),
            submit_enabled: true,
        }
    }
}
