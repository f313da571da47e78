//! Offline bag-of-words embedder.
//!
//! Each lower-cased word token is hashed (SHA-256) into one of `dimensions`
//! buckets and counted. Deterministic across runs and platforms, needs no
//! model files, and gives texts sharing words a positive cosine.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::EmbeddingProvider;
use crate::error::EmbeddingError;

/// Same width as all-MiniLM-L6-v2 so vectors are interchangeable in storage.
pub const DEFAULT_DIMENSIONS: usize = 384;
/// Upper bound on vector width; larger configured values are clamped.
pub const MAX_DIMENSIONS: usize = 8_192;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.clamp(1, MAX_DIMENSIONS),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Synchronous core used by the async trait impl.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let mut idx = [0u8; 8];
            idx.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(idx) % self.dimensions as u64) as usize;
            if let Some(slot) = v.get_mut(bucket) {
                *slot += 1.0;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &'static str {
        "hashing"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}
