//! Ghost-word filter.
//!
//! On noise the recognizer tends to hallucinate short filler words as
//! complete utterances. A finalized result that is exactly one such word is
//! recognizer noise, not speech: it is neither forwarded to the client nor
//! counted as human activity.

use crate::defaults;

/// True if `word` (case-folded) is in the filler-word set.
pub fn is_ghost_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    defaults::GHOST_WORDS.contains(&lower.as_str())
}

/// Whether finalized text should reach the client.
///
/// Suppresses empty text and lone filler words; multi-word utterances pass
/// even when every word is a filler.
pub fn should_forward(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    let mut tokens = trimmed.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(word), None) => !is_ghost_word(word),
        _ => true,
    }
}
