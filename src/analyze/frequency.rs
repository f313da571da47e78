//! Brand mention density.

use super::finish;

/// Amplification applied to the raw mention ratio.
///
/// Tunable policy, not a derived constant: brand mentions are rare relative
/// to text length, so the raw ratio sits far below 0.1 even for on-topic text.
pub const BRAND_FREQUENCY_SCALE: f64 = 10.0;

/// `count(brand tokens) / count(tokens) * BRAND_FREQUENCY_SCALE`, capped at 1.0.
///
/// Tokens are whitespace-separated and compared to the brand name exactly,
/// ignoring case. Punctuation stays attached, so `"Acme,"` does not match.
/// Text without tokens scores 0.0.
pub fn brand_frequency(brand: &str, text: &str) -> f64 {
    let brand = brand.trim().to_lowercase();
    let mut total = 0usize;
    let mut hits = 0usize;
    for token in text.split_whitespace() {
        total += 1;
        if token.to_lowercase() == brand {
            hits += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    finish((hits as f64 / total as f64) * BRAND_FREQUENCY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_brand_scores_zero() {
        assert_eq!(brand_frequency("Acme", "Nothing to see here."), 0.0);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(brand_frequency("Acme", ""), 0.0);
        assert_eq!(brand_frequency("Acme", "   \n\t "), 0.0);
    }

    #[test]
    fn short_brand_heavy_text_is_clamped() {
        assert_eq!(brand_frequency("Acme", "Acme acme ACME"), 1.0);
        assert_eq!(brand_frequency("Acme", "Acme is a great tool, Acme helps everyone."), 1.0);
    }

    #[test]
    fn long_text_stays_discriminative() {
        let mut text = String::from("Acme");
        for _ in 0..99 {
            text.push_str(" filler");
        }
        // 1 hit out of 100 tokens -> 0.01 * 10
        assert_eq!(brand_frequency("acme", &text), 0.1);
    }

    #[test]
    fn punctuation_attached_tokens_do_not_match() {
        assert_eq!(brand_frequency("Acme", "Acme, Acme. Acme!"), 0.0);
    }
}
