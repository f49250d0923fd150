//! Fuzzy wake-phrase scoring.
//!
//! Decides whether a noisy transcription invokes one of the configured
//! wake phrases by running five matching tiers in order, from cheap and
//! precise to tolerant:
//!
//! | Tier | Criterion | Score |
//! |------|-----------|-------|
//! | `Exact` | normalized text equals the phrase | 1.0 |
//! | `Substring` | phrase occurs inside the text | 0.95 |
//! | `TokenSubset` | every phrase token appears among the text tokens | 0.9 |
//! | `WindowFuzzy` | best token-window similarity ≥ span threshold | ratio |
//! | `TokenFuzzy` | best single-token similarity ≥ token threshold | ratio |
//!
//! The first tier that meets its criterion returns immediately. If none
//! does, the maximum similarity ratio observed across all tiers and
//! phrases is returned, so callers can apply their own cutoffs. The
//! token tiers catch single-word mistranscriptions ("sathy" for
//! "sathi") that defeat exact matching.

use crate::config::WakeConfig;
use crate::normalize::{normalize, tokenize};
use similar::TextDiff;

/// Which matching tier produced a confident score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Normalized text equals a normalized phrase.
    Exact,
    /// A phrase occurs verbatim inside the text.
    Substring,
    /// All phrase tokens appear among the text tokens, in any order.
    TokenSubset,
    /// A token window of the text is similar enough to a whole phrase.
    WindowFuzzy,
    /// A single text token is similar enough to a single phrase token.
    TokenFuzzy,
}

/// Outcome of scoring one utterance against the phrase set.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Confidence in `[0.0, 1.0]`.
    pub score: f32,
    /// The normalized phrase that triggered an early return, if any.
    pub matched_phrase: Option<String>,
    /// The tier that met its criterion, if any. `None` means no tier
    /// was confident and `score` is the best ratio observed.
    pub tier: Option<MatchTier>,
}

impl MatchResult {
    fn none(score: f32) -> Self {
        Self {
            score,
            matched_phrase: None,
            tier: None,
        }
    }
}

/// Wake-phrase scorer over a fixed phrase set.
///
/// Phrases are normalized once at construction; entries that normalize
/// to the empty string are dropped. Scoring is pure and stateless, so a
/// scorer can be shared freely across tasks.
pub struct WakeScorer {
    phrases: Vec<String>,
    span_threshold: f32,
    token_threshold: f32,
}

impl WakeScorer {
    /// Build a scorer from the wake configuration.
    #[must_use]
    pub fn new(config: &WakeConfig) -> Self {
        let phrases: Vec<String> = config
            .phrases
            .iter()
            .map(|p| normalize(p))
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            phrases,
            span_threshold: config.span_threshold,
            token_threshold: config.token_threshold,
        }
    }

    /// Number of usable phrases after normalization.
    #[must_use]
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Score an utterance against the phrase set.
    ///
    /// Convenience wrapper around [`evaluate`](Self::evaluate) that
    /// discards the tier information.
    #[must_use]
    pub fn score(&self, text: &str) -> f32 {
        self.evaluate(text).score
    }

    /// Score an utterance, reporting which tier and phrase matched.
    ///
    /// Returns 0.0 with no tier when the text normalizes to empty or the
    /// phrase set is empty.
    #[must_use]
    pub fn evaluate(&self, text: &str) -> MatchResult {
        let norm = normalize(text);
        if norm.is_empty() {
            return MatchResult::none(0.0);
        }
        let tokens = tokenize(&norm);

        let mut best = 0.0f32;

        for phrase in &self.phrases {
            if norm == *phrase {
                return MatchResult {
                    score: 1.0,
                    matched_phrase: Some(phrase.clone()),
                    tier: Some(MatchTier::Exact),
                };
            }

            if norm.contains(phrase.as_str()) {
                return MatchResult {
                    score: 0.95,
                    matched_phrase: Some(phrase.clone()),
                    tier: Some(MatchTier::Substring),
                };
            }

            let phrase_tokens = tokenize(phrase);
            if phrase_tokens.iter().all(|t| tokens.contains(t)) {
                return MatchResult {
                    score: 0.9,
                    matched_phrase: Some(phrase.clone()),
                    tier: Some(MatchTier::TokenSubset),
                };
            }

            // Slide a phrase-sized window across the text tokens and
            // compare each joined window against the whole phrase.
            let win = phrase_tokens.len().max(1);
            let last_start = tokens.len().saturating_sub(win);
            for start in 0..=last_start {
                let end = (start + win).min(tokens.len());
                let window = tokens[start..end].join(" ");
                let r = ratio(&window, phrase);
                if r > best {
                    best = r;
                }
                if r >= self.span_threshold {
                    return MatchResult {
                        score: r,
                        matched_phrase: Some(phrase.clone()),
                        tier: Some(MatchTier::WindowFuzzy),
                    };
                }
            }

            // Single-token comparisons catch the case where the
            // transcription mangled exactly one word.
            for pt in &phrase_tokens {
                for tk in &tokens {
                    let r = ratio(tk, pt);
                    if r > best {
                        best = r;
                    }
                    if r >= self.token_threshold {
                        return MatchResult {
                            score: r,
                            matched_phrase: Some(phrase.clone()),
                            tier: Some(MatchTier::TokenFuzzy),
                        };
                    }
                }
            }
        }

        MatchResult::none(best)
    }
}

/// Symmetric normalized edit-similarity between two strings.
///
/// Character-level ratio in `[0.0, 1.0]`: identical strings score 1.0,
/// a non-empty string against an empty one scores 0.0.
fn ratio(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}
