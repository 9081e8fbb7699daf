//! Model location and precision

use candle_core::DType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory name of the default checkpoint under the data dir.
pub const DEFAULT_MODEL_DIR: &str = "gemma-3-1b-it";

/// Where to load the checkpoint from and how to run it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local checkpoint directory holding `config.json`, `tokenizer.json`
    /// and the safetensors weights
    pub dir: PathBuf,

    /// HuggingFace repo to fetch from when `dir` does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Run on the CPU even if an accelerator is available
    pub cpu: bool,

    /// Weight precision, picked from the device when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtype: Option<Precision>,
}

impl ModelConfig {
    /// Create a config for a local checkpoint directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            repo: None,
            cpu: false,
            dtype: None,
        }
    }
}

/// `~/.local/share/savant/gemma-3-1b-it` on linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("savant")
        .join(DEFAULT_MODEL_DIR)
}

/// Floating point precision of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit float
    F32,
    /// bfloat16
    Bf16,
    /// 16-bit float
    F16,
}

impl From<Precision> for DType {
    fn from(precision: Precision) -> Self {
        match precision {
            Precision::F32 => DType::F32,
            Precision::Bf16 => DType::BF16,
            Precision::F16 => DType::F16,
        }
    }
}
