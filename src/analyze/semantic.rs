//! Semantic closeness between the brand name and the response text.

use tracing::warn;

use super::finish;
use crate::embedding::EmbeddingProvider;
use crate::error::EngineError;

/// Cosine similarity in `[-1, 1]`.
///
/// Empty, mismatched or zero-norm vectors give 0.0. Accumulates in f64.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let sim = dot / (na.sqrt() * nb.sqrt());
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Map cosine similarity of the two embeddings from `[-1, 1]` onto `[0, 1]`.
pub fn semantic_similarity(brand_vec: &[f32], text_vec: &[f32]) -> f64 {
    finish((cosine_similarity(brand_vec, text_vec) + 1.0) / 2.0)
}

/// Semantic sub-score plus whether it was forced to the fallback value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticOutcome {
    pub score: f64,
    pub degraded: bool,
}

impl SemanticOutcome {
    const DEGRADED: Self = Self {
        score: 0.0,
        degraded: true,
    };
}

/// Embed brand and text with `provider` and score them.
///
/// With `required == false` a missing provider or a failed call degrades the
/// signal to 0.0. With `required == true` both are errors.
pub async fn score_semantic(
    brand: &str,
    text: &str,
    provider: Option<&dyn EmbeddingProvider>,
    required: bool,
) -> Result<SemanticOutcome, EngineError> {
    let Some(provider) = provider else {
        if required {
            return Err(EngineError::UninitializedModel);
        }
        return Ok(SemanticOutcome::DEGRADED);
    };

    let embedded = tokio::try_join!(provider.embed(brand), provider.embed(text));
    match embedded {
        Ok((brand_vec, text_vec)) => Ok(SemanticOutcome {
            score: semantic_similarity(&brand_vec, &text_vec),
            degraded: false,
        }),
        Err(e) if required => Err(EngineError::Embedding(e)),
        Err(e) => {
            warn!(
                target: "visibility",
                provider = provider.name(),
                error = %e,
                "embedding failed; semantic signal degraded"
            );
            Ok(SemanticOutcome::DEGRADED)
        }
    }
}
