//! Configuration resolution for the CLI.
//!
//! Resolves savant.toml in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.savant/savant.toml` (workspace config)
//! 3. `~/.config/savant/savant.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically.

use anyhow::{Context, Result};
use savant_candle::ModelConfig;
use savant_core::{GenerationConfig, ShellConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace config, relative to the current directory.
pub const WORKSPACE_CONFIG: &str = ".savant/savant.toml";

/// Default config template generated when no config exists.
pub const DEFAULT_CONFIG: &str = r#"[model]
# Local checkpoint directory with config.json, tokenizer.json and the
# safetensors weights. Defaults to the savant data directory.
# dir = "/path/to/gemma-3-1b-it"

# Fetched through the HuggingFace hub cache when `dir` does not exist.
repo = "google/gemma-3-1b-it"
cpu = false

[generation]
max_new_tokens = 384
temperature = 1.0
top_p = 0.95
top_k = 64
repeat_penalty = 1.0
repeat_last_n = 64

[shell]
poll_interval_ms = 100
"#;

/// Everything the CLI reads from savant.toml.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SavantConfig {
    /// Checkpoint location and device
    pub model: ModelConfig,
    /// Sampling settings
    pub generation: GenerationConfig,
    /// Shell settings
    pub shell: ShellConfig,
}

impl SavantConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config")
    }
}

/// Resolve the config path following the priority chain.
pub fn resolve_config_path(config_flag: Option<&Path>) -> Result<PathBuf> {
    locate(config_flag, Path::new(WORKSPACE_CONFIG), &global_config_path())
}

/// Resolve and load the config following the priority chain.
pub fn resolve_config(config_flag: Option<&Path>) -> Result<SavantConfig> {
    let path = resolve_config_path(config_flag)?;
    SavantConfig::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// The priority chain over explicit paths.
///
/// An explicit flag must exist. Without a workspace or global config, the
/// default is generated at `global`.
pub fn locate(config_flag: Option<&Path>, workspace: &Path, global: &Path) -> Result<PathBuf> {
    // 1. Explicit --config flag.
    if let Some(path) = config_flag {
        anyhow::ensure!(path.is_file(), "config file {} not found", path.display());
        return Ok(path.to_path_buf());
    }

    // 2. Workspace config.
    if workspace.is_file() {
        return Ok(workspace.to_path_buf());
    }

    // 3. Global default.
    if !global.exists() {
        generate_default_config(global)?;
        tracing::info!("generated default config at {}", global.display());
    }
    Ok(global.to_path_buf())
}

/// Path to the global default config.
pub fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("savant")
        .join("savant.toml")
}

/// Generate a default savant.toml at the given path.
fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}
