//! Signal weights for the composite visibility score.
//!
//! TOML shape (section `[weights]` of `config/visibility.toml`):
//! ```toml
//! sentiment = 0.20
//! semantic = 0.25
//! keyword = 0.15
//! brand_freq = 0.15
//! correctness = 0.15
//! consistency = 0.10
//! ```
//! Missing keys fall back to the defaults above. A set that does not sum to
//! 1.0 is rejected at load time rather than renormalized.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when checking that weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSet {
    pub sentiment: f64,
    pub semantic: f64,
    pub keyword: f64,
    pub brand_freq: f64,
    pub correctness: f64,
    pub consistency: f64,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            sentiment: 0.20,
            semantic: 0.25,
            keyword: 0.15,
            brand_freq: 0.15,
            correctness: 0.15,
            consistency: 0.10,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight `{name}` must be a finite non-negative number, got {value}")]
    Invalid { name: &'static str, value: f64 },

    #[error("weights must sum to 1.0, got {0}")]
    BadSum(f64),
}

impl WeightSet {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("sentiment", self.sentiment),
            ("semantic", self.semantic),
            ("keyword", self.keyword),
            ("brand_freq", self.brand_freq),
            ("correctness", self.correctness),
            ("consistency", self.consistency),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<(), WeightError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::Invalid { name, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum(sum));
        }
        Ok(())
    }
}
