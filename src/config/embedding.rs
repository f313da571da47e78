// src/config/embedding.rs
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

use crate::embedding::hashing::DEFAULT_DIMENSIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    None,
    Hashing,
    Openai,
}

impl FromStr for EmbeddingProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(Self::None),
            "hashing" | "mock" => Ok(Self::Hashing),
            "openai" => Ok(Self::Openai),
            other => anyhow::bail!("Unsupported embedding provider: {other}"),
        }
    }
}

fn default_provider() -> EmbeddingProviderKind {
    EmbeddingProviderKind::Hashing
}
fn default_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default)]
    pub api_key: String,
    /// Only used by the hashing provider.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: String::new(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    /// Resolve `api_key = "ENV"` for providers that need a key.
    pub fn resolve_api_key(&mut self) -> anyhow::Result<()> {
        if self.provider != EmbeddingProviderKind::Openai {
            return Ok(());
        }
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?;
        }
        Ok(())
    }
}
