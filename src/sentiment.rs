//! Sentiment polarity providers.
//!
//! The engine only needs `text -> polarity in [-1, 1]`; the bundled
//! [`LexiconSentiment`] is the default implementation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)[\w']+").expect("token regex"));

/// Normalization constant for the compound score (same alpha as VADER).
pub const COMPOUND_ALPHA: f64 = 15.0;

/// Text -> polarity in `[-1, 1]`.
pub trait SentimentProvider: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
    fn name(&self) -> &'static str;
}

/// Lexicon scorer with short-range negation.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw valence sum, token count).
    /// A negator within the 3 preceding tokens flips the sign of a word's valence.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for (i, w) in tokens.iter().enumerate() {
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl SentimentProvider for LexiconSentiment {
    fn polarity(&self, text: &str) -> f64 {
        let (score, _) = self.score_text(text);
        compound(score)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// `s / sqrt(s^2 + alpha)`, always strictly inside `(-1, 1)`.
pub fn compound(score: i32) -> f64 {
    let s = f64::from(score);
    s / (s * s + COMPOUND_ALPHA).sqrt()
}

/// Word tokens, lower-case, apostrophes kept so "isn't" stays one token.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE.find_iter(s).map(|m| m.as_str().to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "without"
    )
}
