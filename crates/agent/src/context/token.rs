//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 bytes per token, which is close
//! enough for BPE tokenizers on the mostly-ASCII markup we render. Only used
//! to report message size; nothing is trimmed based on it.

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 bytes. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
