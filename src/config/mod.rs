// src/config/mod.rs
//! Service configuration loaded from `config/visibility.toml`.
//!
//! Resolution order:
//! 1) file at $VISIBILITY_CONFIG_PATH, else `config/visibility.toml`
//!    (a missing file means built-in defaults, a malformed one is an error)
//! 2) env overrides: VISIBILITY_SEMANTIC_REQUIRED, EMBEDDING_PROVIDER
//! 3) `api_key = "ENV"` resolution, weight validation

pub mod embedding;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyze::WeightSet;
use crate::embedding::hashing::MAX_DIMENSIONS;
pub use embedding::{EmbeddingConfig, EmbeddingProviderKind};

pub const DEFAULT_CONFIG_PATH: &str = "config/visibility.toml";
pub const ENV_CONFIG_PATH: &str = "VISIBILITY_CONFIG_PATH";
pub const ENV_SEMANTIC_REQUIRED: &str = "VISIBILITY_SEMANTIC_REQUIRED";
pub const ENV_EMBEDDING_PROVIDER: &str = "EMBEDDING_PROVIDER";

/// Upper bound on retained scores per brand.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// When true, a missing or failing embedding provider fails the
    /// evaluation instead of degrading the semantic signal to 0.0.
    #[serde(default)]
    pub required: bool,
}

fn default_capacity() -> usize {
    1_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Scores kept per brand; oldest are dropped first.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub weights: WeightSet,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl VisibilityConfig {
    /// Full resolution: file (or defaults), env overrides, validation.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut cfg = Self::load_from_file(&path)?;
        cfg.apply_env()?;
        cfg.finalize()?;
        Ok(cfg)
    }

    /// Read and parse a TOML file; a missing file yields defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("parsing visibility config at {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(target: "visibility", path = %path.display(), "config file not found; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e)
                .with_context(|| format!("reading visibility config at {}", path.display())),
        }
    }

    /// Parse without env overrides or validation.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Some(flag) = parse_flag_env(std::env::var(ENV_SEMANTIC_REQUIRED).ok()) {
            self.semantic.required = flag;
        }
        if let Ok(raw) = std::env::var(ENV_EMBEDDING_PROVIDER) {
            self.embedding.provider = raw.parse()?;
        }
        Ok(())
    }

    /// Resolve secrets, clamp sizes and validate weights.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.embedding.resolve_api_key()?;
        self.embedding.dimensions = self.embedding.dimensions.clamp(1, MAX_DIMENSIONS);
        self.history.capacity = self.history.capacity.clamp(1, MAX_HISTORY_CAPACITY);
        self.weights.validate().context("invalid [weights] section")?;
        Ok(())
    }
}

/// "1"/"true"/"yes"/"on" -> true, "0"/"false"/"no"/"off" -> false, else None.
fn parse_flag_env(raw: Option<String>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
