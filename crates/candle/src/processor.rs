//! Logits processor

use anyhow::Result;
use candle_core::Tensor;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use savant_core::GenerationConfig;

/// Samples the next token from the logits of the last position.
pub struct Processor {
    /// The logits processor
    processor: LogitsProcessor,

    /// The repeat penalty
    repeat_penalty: f32,

    /// The repeat last n
    repeat_last_n: usize,
}

impl Processor {
    /// Create a processor, seeding it randomly unless a seed is configured
    pub fn new(config: &GenerationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            processor: LogitsProcessor::from_sampling(seed, sampling(config)),
            repeat_penalty: config.repeat_penalty,
            repeat_last_n: config.repeat_last_n,
        }
    }

    /// Sample the next token, penalizing repeats of `tokens`
    pub fn sample(&mut self, logits: &Tensor, tokens: &[u32]) -> Result<u32> {
        let logits = self.repeat_penalty(logits, tokens)?;
        self.processor
            .sample(&logits)
            .map_err(|e| anyhow::anyhow!("failed to sample: {e}"))
    }

    /// Apply repeat penalty
    fn repeat_penalty(&self, logits: &Tensor, tokens: &[u32]) -> Result<Tensor> {
        if self.repeat_penalty == 1. || tokens.is_empty() {
            Ok(logits.clone())
        } else {
            let start_at = tokens.len().saturating_sub(self.repeat_last_n);
            candle_transformers::utils::apply_repeat_penalty(
                logits,
                self.repeat_penalty,
                &tokens[start_at..],
            )
            .map_err(|e| anyhow::anyhow!("failed to apply repeat penalty: {e}"))
        }
    }
}

/// The sampling strategy for a config; a zero temperature is greedy.
pub fn sampling(config: &GenerationConfig) -> Sampling {
    let temperature = config.temperature;
    if !config.is_sampling() {
        return Sampling::ArgMax;
    }

    match (config.top_k, config.top_p) {
        (None, None) => Sampling::All { temperature },
        (Some(k), None) => Sampling::TopK { k, temperature },
        (None, Some(p)) => Sampling::TopP { p, temperature },
        (Some(k), Some(p)) => Sampling::TopKThenTopP { k, p, temperature },
    }
}
