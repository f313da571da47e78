// src/embedding/mod.rs
//! Embedding providers: provider abstraction, offline hashing embedder and
//! an OpenAI-compatible HTTP client.

pub mod hashing;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EmbeddingConfig, EmbeddingProviderKind};
use crate::error::EmbeddingError;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

/// Text -> vector. One call per string.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Convenient alias used by callers.
pub type DynEmbedder = Arc<dyn EmbeddingProvider>;

/// Factory: build the configured provider, or `None` when embeddings are off.
pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<Option<DynEmbedder>, EmbeddingError> {
    match cfg.provider {
        EmbeddingProviderKind::None => Ok(None),
        EmbeddingProviderKind::Hashing => Ok(Some(Arc::new(HashingEmbedder::new(cfg.dimensions)))),
        EmbeddingProviderKind::Openai => Ok(Some(Arc::new(OpenAiEmbedder::new(cfg)?))),
    }
}
