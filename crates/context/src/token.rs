//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~3 characters per token, deliberately
//! conservative for mixed-script text. The constant is a behavioral
//! contract — budgets and tests are calibrated against it, so replacing it
//! with a real tokenizer is a breaking change, not a refinement.

use localbrain_core::turn::Turn;

/// Fixed per-bundle overhead for section headers and prompt scaffolding,
/// counted once regardless of how many turns survive trimming.
pub const BUNDLE_OVERHEAD_TOKENS: usize = 64;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 3 characters. Rounds down.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 3
}

/// Estimate tokens for a single turn.
pub fn estimate_turn_tokens(turn: &Turn) -> usize {
    estimate_tokens(&turn.content)
}

/// Estimate tokens for a slice of turns.
pub fn estimate_turns_tokens(turns: &[Turn]) -> usize {
    turns.iter().map(estimate_turn_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use localbrain_core::turn::{ConversationId, Turn, UserId};

    fn turn(content: &str) -> Turn {
        Turn::user(UserId::from("u1"), ConversationId::from("c1"), content)
    }

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn three_chars_is_one_token() {
        assert_eq!(estimate_tokens("abc"), 1);
    }

    #[test]
    fn short_strings_round_down() {
        assert_eq!(estimate_tokens("ab"), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
    }

    #[test]
    fn ninety_chars() {
        let text = "a".repeat(90);
        assert_eq!(estimate_tokens(&text), 30);
    }

    #[test]
    fn multibyte_text_counts_bytes() {
        // Cyrillic chars are 2 bytes each in UTF-8; the heuristic is
        // byte-based, which is what makes it conservative for mixed script.
        assert_eq!(estimate_tokens("привіт"), 4);
    }

    #[test]
    fn turns_sum_correctly() {
        let turns = vec![turn("123456"), turn("123")];
        assert_eq!(estimate_turns_tokens(&turns), 3);
    }
}
