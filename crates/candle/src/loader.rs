//! Checkpoint file resolution

use crate::ModelConfig;
use anyhow::{Context, Result};
use hf_hub::api::sync::Api;
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

const CONFIG: &str = "config.json";
const TOKENIZER: &str = "tokenizer.json";
const SAFETENSORS: &str = "model.safetensors";
const SAFETENSORS_INDEX: &str = "model.safetensors.index.json";

/// The files making up a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    /// The model config
    pub config: PathBuf,

    /// The tokenizer
    pub tokenizer: PathBuf,

    /// The safetensors weights, one entry per shard
    pub weights: Vec<PathBuf>,
}

impl ModelFiles {
    /// Resolve the checkpoint from the local directory, or from the
    /// configured HuggingFace repo when the directory does not exist.
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        if config.dir.is_dir() {
            return Self::from_dir(&config.dir);
        }

        match &config.repo {
            Some(repo) => {
                tracing::info!("{} not found, fetching {repo}", config.dir.display());
                Self::from_hub(repo)
            }
            None => anyhow::bail!(
                "model directory {} does not exist and no repo is configured",
                config.dir.display()
            ),
        }
    }

    /// Resolve a checkpoint stored in a local directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let existing = |name: &str| -> Result<PathBuf> {
            let path = dir.join(name);
            anyhow::ensure!(path.is_file(), "missing {}", path.display());
            Ok(path)
        };

        let config = existing(CONFIG)?;
        let tokenizer = existing(TOKENIZER)?;
        let weights = if dir.join(SAFETENSORS).is_file() {
            vec![dir.join(SAFETENSORS)]
        } else {
            let index = existing(SAFETENSORS_INDEX)
                .with_context(|| format!("no safetensors weights in {}", dir.display()))?;
            shards(&index)?
                .into_iter()
                .map(|shard| existing(shard.as_str()))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }

    /// Fetch a checkpoint through the HuggingFace hub cache.
    pub fn from_hub(repo: &str) -> Result<Self> {
        let api = Api::new()?;
        let repo = api.model(repo.to_string());
        let config = repo.get(CONFIG)?;
        let tokenizer = repo.get(TOKENIZER)?;
        let weights = match repo.get(SAFETENSORS) {
            Ok(path) => vec![path],
            Err(_) => {
                let index = repo.get(SAFETENSORS_INDEX)?;
                shards(&index)?
                    .iter()
                    .map(|shard| repo.get(shard).map_err(Into::into))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}

/// The shard file names listed in a safetensors index, deduplicated.
fn shards(index: &Path) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct Index {
        weight_map: HashMap<String, String>,
    }

    let content =
        fs::read(index).with_context(|| format!("failed to read {}", index.display()))?;
    let index: Index = serde_json::from_slice(&content)
        .with_context(|| format!("failed to parse {}", index.display()))?;
    Ok(index
        .weight_map
        .into_values()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}
