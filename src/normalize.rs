//! Text normalization shared by wake-phrase scoring and intent matching.
//!
//! Speech transcriptions arrive with arbitrary casing, punctuation, and
//! spacing. Everything downstream matches on the normalized form:
//! lowercase, `[a-z0-9 ]` only, single spaces, trimmed.

/// Normalize transcribed text for matching.
///
/// Lowercases the input, replaces every character outside `[a-z0-9 ]`
/// with a space, collapses whitespace runs, and trims. Deterministic and
/// pure; empty input yields empty output.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Split normalized text into tokens.
///
/// Only meaningful on output of [`normalize`], where tokens are separated
/// by single spaces.
#[must_use]
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}
