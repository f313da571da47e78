// src/analyze/mod.rs
//! Sub-score calculators and the composite scorer.
//!
//! Every calculator is a pure function of its inputs and returns a value in
//! `[0, 1]`, rounded to [`SUBSCORE_DECIMALS`] places. Only the composite
//! scorer works on the `[0, 100]` scale.

pub mod consistency;
pub mod correctness;
pub mod frequency;
pub mod keywords;
pub mod scoring;
pub mod semantic;
pub mod weights;

// Re-export convenient types.
pub use crate::analyze::consistency::consistency_score;
pub use crate::analyze::correctness::correctness_score;
pub use crate::analyze::frequency::brand_frequency;
pub use crate::analyze::keywords::{extract_keywords, keyword_match};
pub use crate::analyze::scoring::{composite_score, sentiment_subscore, SubScores};
pub use crate::analyze::semantic::{cosine_similarity, semantic_similarity};
pub use crate::analyze::weights::WeightSet;

/// Decimal places kept on every `[0, 1]` sub-score.
pub const SUBSCORE_DECIMALS: i32 = 3;
/// Decimal places kept on the `[0, 100]` visibility score.
pub const SCORE_DECIMALS: i32 = 2;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Clamp into `[0, 1]`; NaN collapses to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Final step shared by the calculators: clamp, then round.
pub(crate) fn finish(value: f64) -> f64 {
    round_to(clamp_unit(value), SUBSCORE_DECIMALS)
}
