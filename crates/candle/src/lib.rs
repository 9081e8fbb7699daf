//! Savant candle backend: Gemma 3 on candle

mod config;
mod device;
mod generate;
mod loader;
mod model;
mod processor;
mod template;
mod token;

pub use {
    config::{DEFAULT_MODEL_DIR, ModelConfig, Precision, default_model_dir},
    device::placement,
    generate::{Decoding, sample_len},
    loader::ModelFiles,
    model::Gemma3,
    processor::{Processor, sampling},
    template::{ChatTemplate, Gemma3Template},
    token::TokenDecoder,
};
