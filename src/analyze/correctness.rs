//! Correctness stand-in.
//!
//! Binary presence heuristic kept until a real fact-verification signal
//! exists. Both constants are policy and part of the scoring contract.

use super::finish;

/// Score when the brand is mentioned anywhere in the text.
pub const CORRECTNESS_PRESENT: f64 = 1.0;
/// Floor when the brand is not mentioned.
pub const CORRECTNESS_ABSENT: f64 = 0.3;

/// [`CORRECTNESS_PRESENT`] if `brand` occurs (case-insensitive substring) in `text`.
pub fn correctness_score(brand: &str, text: &str) -> f64 {
    let brand = brand.trim().to_lowercase();
    let present = !brand.is_empty() && text.to_lowercase().contains(&brand);
    finish(if present {
        CORRECTNESS_PRESENT
    } else {
        CORRECTNESS_ABSENT
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_brand_scores_full() {
        assert_eq!(correctness_score("Acme", "we like ACME's products"), 1.0);
    }

    #[test]
    fn absent_brand_scores_floor() {
        assert_eq!(correctness_score("Acme", "nothing relevant"), 0.3);
        assert_eq!(correctness_score("Acme", ""), 0.3);
    }
}
