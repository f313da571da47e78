//! # Evaluation Engine
//! Sequences the calculators for one `(brand, text)` pair and combines them.
//! No I/O besides the optional embedding call; no state shared between
//! evaluations.
//!
//! Order: keywords → keyword match, brand frequency, correctness, sentiment
//! (text only) → semantic similarity (may degrade) → consistency (history
//! snapshot) → composite score.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyze::scoring::baseline_score;
use crate::analyze::semantic::score_semantic;
use crate::analyze::{
    brand_frequency, composite_score, consistency_score, correctness_score, extract_keywords,
    keyword_match, sentiment_subscore, SubScores, WeightSet,
};
use crate::config::VisibilityConfig;
use crate::embedding::{DynEmbedder, EmbeddingProvider};
use crate::error::EngineError;
use crate::history::{HistorySnapshot, HistoryStore};
use crate::sentiment::{LexiconSentiment, SentimentProvider};

/// Validated input for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationInput {
    brand_name: String,
    raw_text: String,
}

impl EvaluationInput {
    /// Fails with [`EngineError::EmptyBrandName`] if the trimmed brand is empty.
    pub fn new(brand_name: impl Into<String>, raw_text: impl Into<String>) -> Result<Self, EngineError> {
        let brand_name = brand_name.into().trim().to_string();
        if brand_name.is_empty() {
            return Err(EngineError::EmptyBrandName);
        }
        Ok(Self {
            brand_name,
            raw_text: raw_text.into(),
        })
    }

    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub brand_name: String,
    pub keywords: Vec<String>,
    pub sub_scores: SubScores,
    /// Composite score in [0, 100].
    pub visibility_score: f64,
    /// True when the semantic signal fell back to 0.0.
    pub semantic_degraded: bool,
    /// Number of history entries the consistency signal was computed from.
    pub history_len: usize,
}

/// Scoring capabilities and policy, passed explicitly instead of held globally.
#[derive(Clone)]
pub struct Engine {
    weights: WeightSet,
    semantic_required: bool,
    sentiment: Arc<dyn SentimentProvider>,
    embedder: Option<DynEmbedder>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(WeightSet::default(), Arc::new(LexiconSentiment::new()), None)
    }
}

impl Engine {
    pub fn new(
        weights: WeightSet,
        sentiment: Arc<dyn SentimentProvider>,
        embedder: Option<DynEmbedder>,
    ) -> Self {
        Self {
            weights,
            semantic_required: false,
            sentiment,
            embedder,
        }
    }

    /// Engine with the configured weights and semantic policy.
    pub fn from_config(cfg: &VisibilityConfig, embedder: Option<DynEmbedder>) -> Self {
        Self::new(cfg.weights, Arc::new(LexiconSentiment::new()), embedder)
            .semantic_required(cfg.semantic.required)
    }

    /// Builder: fail instead of degrading when embeddings are unavailable.
    pub fn semantic_required(mut self, required: bool) -> Self {
        self.semantic_required = required;
        self
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    pub fn is_semantic_required(&self) -> bool {
        self.semantic_required
    }

    pub fn embedder_name(&self) -> Option<&'static str> {
        self.embedder.as_ref().map(|e| e.name())
    }

    /// Validate, then evaluate.
    pub async fn evaluate_text(
        &self,
        brand_name: &str,
        raw_text: &str,
        history: &HistorySnapshot,
    ) -> Result<Evaluation, EngineError> {
        let input = EvaluationInput::new(brand_name, raw_text)?;
        self.evaluate(&input, history).await
    }

    /// Score `input` against a read-only `history` snapshot (0–100 scores).
    ///
    /// Same input and snapshot give bit-identical output as long as the
    /// embedding provider is deterministic.
    pub async fn evaluate(
        &self,
        input: &EvaluationInput,
        history: &HistorySnapshot,
    ) -> Result<Evaluation, EngineError> {
        let started = Instant::now();
        let brand = input.brand_name();
        let text = input.raw_text();

        // (1) text-only signals
        let keywords = extract_keywords(text);
        let keyword = keyword_match(&keywords, text);
        let frequency = brand_frequency(brand, text);
        let correctness = correctness_score(brand, text);
        let sentiment = sentiment_subscore(self.sentiment.polarity(text));

        // (2) semantic similarity
        let embedder: Option<&dyn EmbeddingProvider> = self.embedder.as_deref();
        let semantic = score_semantic(brand, text, embedder, self.semantic_required).await?;

        let mut sub_scores = SubScores {
            sentiment,
            semantic_similarity: semantic.score,
            keyword_match: keyword,
            brand_frequency: frequency,
            correctness,
            consistency: 1.0,
        };

        // (3) consistency on the unit scale, composite against past composites
        let current = baseline_score(&sub_scores, &self.weights);
        let past: Vec<f64> = history.entries.iter().map(|e| e.score / 100.0).collect();
        sub_scores.consistency = consistency_score(&past, current);

        // (4) composite
        let visibility_score = composite_score(&sub_scores, &self.weights);

        counter!("visibility_evaluations_total").increment(1);
        if semantic.degraded {
            counter!("visibility_semantic_degraded_total").increment(1);
        }
        gauge!("visibility_last_score").set(visibility_score);
        histogram!("visibility_evaluation_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        debug!(
            target: "visibility",
            id = %anon_hash(brand),
            score = visibility_score,
            history = history.len(),
            degraded = semantic.degraded,
            "evaluation complete"
        );

        Ok(Evaluation {
            brand_name: brand.to_string(),
            keywords,
            sub_scores,
            visibility_score,
            semantic_degraded: semantic.degraded,
            history_len: history.len(),
        })
    }
}

/// Append a finished score to the brand's history.
pub fn record(store: &dyn HistoryStore, brand_name: &str, visibility_score: f64) {
    store.record(brand_name, visibility_score);
}

/// Short SHA-256 prefix used in logs instead of raw brand names or text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::history::InMemoryHistory;

    /// Sentiment stub with a fixed polarity.
    struct Fixed(f64);
    impl SentimentProvider for Fixed {
        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn engine_with_sentiment(p: f64) -> Engine {
        Engine::new(WeightSet::default(), Arc::new(Fixed(p)), None)
    }

    const ACME: &str = "Acme is a great tool, Acme helps everyone.";

    #[tokio::test]
    async fn acme_example_without_history_or_embeddings() {
        let eval = engine_with_sentiment(0.6)
            .evaluate_text("Acme", ACME, &HistorySnapshot::default())
            .await
            .unwrap();

        let s = eval.sub_scores;
        assert_eq!(s.sentiment, 0.8);
        assert_eq!(s.semantic_similarity, 0.0);
        assert_eq!(s.keyword_match, 1.0);
        assert_eq!(s.brand_frequency, 1.0);
        assert_eq!(s.correctness, 1.0);
        assert_eq!(s.consistency, 1.0);
        assert!(eval.semantic_degraded);
        // 0.20*0.8 + 0.25*0 + 0.15 + 0.15 + 0.15 + 0.10
        assert_eq!(eval.visibility_score, 71.0);
    }

    #[tokio::test]
    async fn empty_brand_is_rejected_up_front() {
        let err = Engine::default()
            .evaluate_text("   ", ACME, &HistorySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyBrandName));
    }

    #[tokio::test]
    async fn required_semantic_without_provider_fails() {
        let err = engine_with_sentiment(0.0)
            .semantic_required(true)
            .evaluate_text("Acme", ACME, &HistorySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UninitializedModel));
    }

    #[tokio::test]
    async fn embeddings_fill_the_semantic_signal() {
        let engine = Engine::new(
            WeightSet::default(),
            Arc::new(Fixed(0.0)),
            Some(Arc::new(HashingEmbedder::default())),
        );
        let eval = engine
            .evaluate_text("Acme", ACME, &HistorySnapshot::default())
            .await
            .unwrap();
        assert!(!eval.semantic_degraded);
        assert!(eval.sub_scores.semantic_similarity > 0.5);
    }

    #[tokio::test]
    async fn repeated_identical_runs_settle_at_full_consistency() {
        let engine = Engine::default();
        let store = InMemoryHistory::default();

        let mut scores = Vec::new();
        for run in 0..4 {
            let eval = engine
                .evaluate_text("Acme", ACME, &store.snapshot("Acme"))
                .await
                .unwrap();
            assert_eq!(eval.history_len, run);
            assert_eq!(eval.sub_scores.consistency, 1.0, "run {run}");
            record(&store, "Acme", eval.visibility_score);
            scores.push(eval.visibility_score);
        }
        assert!(scores.iter().all(|s| s.to_bits() == scores[0].to_bits()), "{scores:?}");
    }

    #[tokio::test]
    async fn recorded_spread_lowers_consistency() {
        let engine = engine_with_sentiment(0.6);
        let store = InMemoryHistory::default();

        let first = engine
            .evaluate_text("Acme", ACME, &store.snapshot("Acme"))
            .await
            .unwrap();
        for text in ["Nothing to see here.", ACME] {
            let eval = engine
                .evaluate_text("Acme", text, &store.snapshot("Acme"))
                .await
                .unwrap();
            record(&store, "Acme", eval.visibility_score);
        }

        let shaky = engine
            .evaluate_text("Acme", ACME, &store.snapshot("Acme"))
            .await
            .unwrap();
        assert!(shaky.sub_scores.consistency < 1.0);
        assert!(shaky.sub_scores.consistency >= 0.0);
        assert!(shaky.visibility_score < first.visibility_score);
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let engine = Engine::new(
            WeightSet::default(),
            Arc::new(LexiconSentiment::new()),
            Some(Arc::new(HashingEmbedder::default())),
        );
        let snap = HistorySnapshot::from_scores([12.5, 88.0]);
        let a = engine.evaluate_text("Acme", ACME, &snap).await.unwrap();
        let b = engine.evaluate_text("Acme", ACME, &snap).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.visibility_score.to_bits(), b.visibility_score.to_bits());
    }

    #[tokio::test]
    async fn record_appends_to_store() {
        let store = InMemoryHistory::default();
        let eval = Engine::default()
            .evaluate_text("Acme", ACME, &store.snapshot("Acme"))
            .await
            .unwrap();
        record(&store, "Acme", eval.visibility_score);
        assert_eq!(store.snapshot("acme").scores(), vec![eval.visibility_score]);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        assert_eq!(anon_hash("Acme").len(), 12);
        assert_eq!(anon_hash("Acme"), anon_hash("Acme"));
        assert_ne!(anon_hash("Acme"), anon_hash("acme"));
    }
}
