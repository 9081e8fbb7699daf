//! The token-by-token decoding loop

use crate::{Processor, TokenDecoder};
use anyhow::Result;
use candle_core::Tensor;
use savant_core::{CancelToken, GenerationConfig, TokenSink};
use tokenizers::Tokenizer;

/// How many tokens may be generated after a prompt of `prompt_len`.
///
/// Bounded by `max_new_tokens` and by what is left of the context window; a
/// prompt that fills the window is refused.
pub fn sample_len(prompt_len: usize, context: usize, max_new_tokens: usize) -> Result<usize> {
    anyhow::ensure!(
        prompt_len < context,
        "prompt of {prompt_len} tokens exceeds the context of {context}"
    );
    Ok(max_new_tokens.min(context - prompt_len))
}

/// Sampling, stop tokens and detokenization around a forward step.
pub struct Decoding<'g> {
    tokenizer: &'g Tokenizer,
    stop: &'g [u32],
    config: &'g GenerationConfig,
}

impl<'g> Decoding<'g> {
    /// Create a decoding run
    pub fn new(tokenizer: &'g Tokenizer, stop: &'g [u32], config: &'g GenerationConfig) -> Self {
        Self {
            tokenizer,
            stop,
            config,
        }
    }

    /// Generate up to `sample_len` tokens after `tokens`, pushing text into
    /// `sink` as words complete.
    ///
    /// `forward` receives the tokens not yet seen by the model and their
    /// start position, and returns the f32 logits of the last position. The
    /// loop ends on a stop token, which is never emitted, on cancellation, or
    /// once the sink hangs up. Returns the number of tokens generated.
    pub fn run<F>(
        &self,
        mut forward: F,
        mut tokens: Vec<u32>,
        sample_len: usize,
        cancel: &CancelToken,
        sink: &TokenSink,
    ) -> Result<usize>
    where
        F: FnMut(&[u32], usize) -> Result<Tensor>,
    {
        let mut processor = Processor::new(self.config);
        let mut decoder = TokenDecoder::new(self.tokenizer);
        let prompt_len = tokens.len();

        for index in 0..sample_len {
            if cancel.is_cancelled() {
                tracing::debug!("generation cancelled after {index} tokens");
                return Ok(index);
            }

            let context_size = if index > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len().saturating_sub(context_size);
            let logits = forward(&tokens[start_pos..], start_pos)?;

            let next = processor.sample(&logits, &tokens[prompt_len..])?;
            if self.stop.contains(&next) {
                break;
            }

            tokens.push(next);
            let Some(fragment) = decoder.next_token(next)? else {
                continue;
            };
            if !sink.push(fragment) {
                return Ok(tokens.len() - prompt_len);
            }
        }

        if let Some(rest) = decoder.flush()? {
            sink.push(rest);
        }

        let generated = tokens.len() - prompt_len;
        tracing::debug!("generated {generated} tokens");
        Ok(generated)
    }
}
