//! Generation and polling configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling configuration for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// The maximum number of new tokens to generate
    pub max_new_tokens: usize,

    /// The sampling temperature, `0` means greedy decoding
    pub temperature: f64,

    /// The top-p of the sampler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// The top-k of the sampler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    /// The seed of the sampler, random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// The repeat penalty, `1.0` disables it
    pub repeat_penalty: f32,

    /// How many trailing tokens the repeat penalty looks at
    pub repeat_last_n: usize,
}

impl GenerationConfig {
    /// Whether tokens are sampled rather than picked greedily
    pub fn is_sampling(&self) -> bool {
        self.temperature > 0.
    }

    /// Set the max new tokens
    pub fn max_new_tokens(mut self, max_new_tokens: usize) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the top-p
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the top-k
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the repeat penalty
    pub fn repeat_penalty(mut self, repeat_penalty: f32) -> Self {
        self.repeat_penalty = repeat_penalty;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 384,
            temperature: 1.0,
            top_p: Some(0.95),
            top_k: Some(64),
            seed: None,
            repeat_penalty: 1.0,
            repeat_last_n: 64,
        }
    }
}

/// Shell configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Period of the relay poll timer in milliseconds
    pub poll_interval_ms: u64,
}

impl ShellConfig {
    /// The poll period as a duration, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}
