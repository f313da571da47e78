//! Typed errors for the scoring engine and its model providers.

use thiserror::Error;

/// Failures an embedding provider can report.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider API error: status={status}, body={body}")]
    Api { status: u16, body: String },
}

/// Failures surfaced by [`crate::engine::evaluate`].
///
/// Everything else degrades to an in-range sub-score instead of failing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Precondition: the brand name must contain a non-whitespace character.
    #[error("brand name must not be empty")]
    EmptyBrandName,

    /// Semantic similarity is required but no embedding provider is configured.
    #[error("embedding model is not initialized")]
    UninitializedModel,

    /// Semantic similarity is required and the provider call failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}
