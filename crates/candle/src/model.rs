//! Gemma 3 model adapter

use crate::{
    ChatTemplate, Decoding, Gemma3Template, ModelConfig, ModelFiles, generate::sample_len,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::gemma3;
use parking_lot::Mutex;
use savant_core::{CancelToken, Generate, GenerationConfig, Message, TokenSink, TokenStream};
use std::{fs, sync::Arc};
use tokenizers::Tokenizer;

/// The loaded network and the device it lives on.
struct Engine {
    model: gemma3::Model,
    device: Device,
}

/// A Gemma 3 instruction-tuned checkpoint, ready to generate.
///
/// Loading happens once; every [`Generate::start`] runs on its own thread
/// against the shared weights, one generation at a time.
#[derive(Clone)]
pub struct Gemma3 {
    engine: Arc<Mutex<Engine>>,
    tokenizer: Arc<Tokenizer>,
    stop: Arc<Vec<u32>>,
    generation: GenerationConfig,
    context: usize,
}

impl Gemma3 {
    /// Load the checkpoint described by `config`.
    pub fn load(config: &ModelConfig, generation: GenerationConfig) -> Result<Self> {
        let files = ModelFiles::resolve(config)?;
        let (device, dtype) = crate::placement(config)?;

        let content = fs::read(&files.config)
            .with_context(|| format!("failed to read {}", files.config.display()))?;
        let cfg: gemma3::Config = serde_json::from_slice(&content)
            .with_context(|| format!("failed to parse {}", files.config.display()))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            anyhow::anyhow!("failed to load {}: {e}", files.tokenizer.display())
        })?;
        let stop = Gemma3Template::STOP_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect::<Vec<_>>();
        anyhow::ensure!(!stop.is_empty(), "tokenizer has no end-of-turn token");

        tracing::info!(
            "loading {} weight file(s) as {dtype:?} on {device:?}",
            files.weights.len()
        );
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&files.weights, dtype, &device)? };
        let model = gemma3::Model::new(false, &cfg, vb)?;

        Ok(Self {
            engine: Arc::new(Mutex::new(Engine { model, device })),
            tokenizer: Arc::new(tokenizer),
            stop: Arc::new(stop),
            generation,
            context: cfg.max_position_embeddings,
        })
    }
}

impl Generate for Gemma3 {
    fn start(&self, messages: &[Message], cancel: CancelToken) -> Result<TokenStream> {
        let prompt = Gemma3Template::format(messages)?;
        // the template already carries <bos>
        let tokens = self
            .tokenizer
            .encode(prompt, false)
            .map_err(|e| anyhow::anyhow!("failed to encode prompt: {e}"))?
            .get_ids()
            .to_vec();
        let sample_len = sample_len(tokens.len(), self.context, self.generation.max_new_tokens)?;
        let this = self.clone();
        TokenStream::spawn("savant-generate", move |sink| {
            let mut engine = this.engine.lock();
            engine.generate(&this, tokens, sample_len, &cancel, &sink)
        })
    }
}

impl Engine {
    fn generate(
        &mut self,
        gemma: &Gemma3,
        tokens: Vec<u32>,
        sample_len: usize,
        cancel: &CancelToken,
        sink: &TokenSink,
    ) -> Result<()> {
        let Engine { model, device } = self;
        model.clear_kv_cache();

        let forward = |input: &[u32], start_pos: usize| -> Result<Tensor> {
            let input = Tensor::new(input, device)?.unsqueeze(0)?;
            let logits = model.forward(&input, start_pos)?;
            Ok(logits.squeeze(0)?.squeeze(0)?.to_dtype(DType::F32)?)
        };
        Decoding::new(&gemma.tokenizer, &gemma.stop, &gemma.generation)
            .run(forward, tokens, sample_len, cancel, sink)?;
        Ok(())
    }
}
