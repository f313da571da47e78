//! Stability of the current score against earlier scores of the same brand.
//!
//! Operates on the unit scale. Callers holding 0–100 visibility scores
//! divide by 100 first (see `engine::evaluate`).

use super::finish;

/// `1 - mean(|current - s_i|)`, clamped to `[0, 1]`.
///
/// An empty history (or one with no finite values) is vacuously consistent
/// and scores 1.0.
pub fn consistency_score(history: &[f64], current: f64) -> f64 {
    let current = if current.is_finite() { current } else { 0.0 };
    let mut sum = 0.0;
    let mut n = 0usize;
    for &s in history.iter().filter(|s| s.is_finite()) {
        sum += (current - s).abs();
        n += 1;
    }
    if n == 0 {
        return 1.0;
    }
    finish(1.0 - sum / n as f64)
}
