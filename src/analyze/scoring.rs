//! Composite scoring.
//!
//! `SubScores` holds six normalized signals in [0,1]:
//! - `sentiment`           : polarity of the response, mapped from [-1,1]
//! - `semantic_similarity` : embedding closeness of brand name and response
//! - `keyword_match`       : share of extracted keywords found in the response
//! - `brand_frequency`     : amplified brand mention density
//! - `correctness`         : presence heuristic
//! - `consistency`         : stability against the brand's earlier scores
//!
//! Visibility = 100 * Σ w_i * s_i, rounded to 2 decimals.

use serde::{Deserialize, Serialize};

use super::{finish, round_to, WeightSet, SCORE_DECIMALS};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub sentiment: f64,
    pub semantic_similarity: f64,
    pub keyword_match: f64,
    pub brand_frequency: f64,
    pub correctness: f64,
    pub consistency: f64,
}

/// Map a polarity in `[-1, 1]` onto `[0, 1]`. Non-finite polarity is neutral.
pub fn sentiment_subscore(polarity: f64) -> f64 {
    let p = if polarity.is_finite() { polarity } else { 0.0 };
    finish((p + 1.0) / 2.0)
}

/// Weighted sum scaled to `[0, 100]`.
///
/// Sub-scores are taken as produced by their calculators; nothing is
/// re-clamped here.
pub fn composite_score(s: &SubScores, w: &WeightSet) -> f64 {
    let raw = w.sentiment * s.sentiment
        + w.semantic * s.semantic_similarity
        + w.keyword * s.keyword_match
        + w.brand_freq * s.brand_frequency
        + w.correctness * s.correctness
        + w.consistency * s.consistency;
    round_to(raw * 100.0, SCORE_DECIMALS)
}

/// Composite of `s` with consistency pinned to 1.0, on the unit scale.
///
/// History stores composites, so this is the value consistency compares
/// against it. A run that matches its history scores consistency 1.0 and
/// records exactly this composite again.
pub fn baseline_score(s: &SubScores, w: &WeightSet) -> f64 {
    let pinned = SubScores {
        consistency: 1.0,
        ..*s
    };
    composite_score(&pinned, w) / 100.0
}
