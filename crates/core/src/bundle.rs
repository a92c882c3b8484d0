//! The context bundle — the assembler's output.
//!
//! A bundle carries three ordered sequences of turns (recency window,
//! in-conversation semantic matches, cross-conversation semantic matches)
//! plus metadata describing what was trimmed or degraded along the way.
//! Bundles are constructed fresh per query and never persisted.

use crate::turn::Turn;
use serde::{Deserialize, Serialize};

/// The assembled context for a single query.
///
/// Invariants maintained by the assembler:
/// - `estimated_tokens` never exceeds the configured budget
/// - no turn id appears in more than one of the three sequences
/// - `recent` is in strictly increasing position order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Most recent turns of the conversation, chronological order.
    /// Always included regardless of relevance.
    pub recent: Vec<Turn>,

    /// Semantic matches from the current conversation, ranked by similarity.
    pub current_scope: Vec<Turn>,

    /// Semantic matches from the user's other conversations, ranked by
    /// similarity.
    pub global_scope: Vec<Turn>,

    /// Estimated token total across all three sequences plus fixed overhead.
    pub estimated_tokens: usize,

    /// Assembly metadata (budget, degradation, trim records).
    pub metadata: BundleMetadata,
}

/// Metadata about how a bundle was assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Configured token budget the bundle was trimmed to.
    pub budget: usize,

    /// True when semantic retrieval was skipped or partially failed and the
    /// bundle carries less context than a healthy call would produce.
    pub degraded: bool,

    /// Human-readable reason for degradation, when degraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,

    /// Turns dropped from each sequence during budget trimming.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drops: Vec<DropInfo>,
}

/// A record of turns dropped from one sequence during budget enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropInfo {
    /// Which sequence: "recent", "current_scope", or "global_scope".
    pub sequence: String,

    /// Number of turns dropped.
    pub turns_dropped: usize,

    /// Estimated tokens of the dropped content.
    pub tokens_dropped: usize,
}

impl ContextBundle {
    /// A bundle with no turns at all.
    pub fn empty(budget: usize) -> Self {
        Self {
            recent: Vec::new(),
            current_scope: Vec::new(),
            global_scope: Vec::new(),
            estimated_tokens: 0,
            metadata: BundleMetadata {
                budget,
                degraded: false,
                degraded_reason: None,
                drops: Vec::new(),
            },
        }
    }

    /// Total number of turns across all three sequences.
    pub fn turn_count(&self) -> usize {
        self.recent.len() + self.current_scope.len() + self.global_scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turn_count() == 0
    }

    /// Whether any sequence contains a turn with the given id.
    pub fn contains(&self, turn_id: &str) -> bool {
        self.recent
            .iter()
            .chain(&self.current_scope)
            .chain(&self.global_scope)
            .any(|t| t.id == turn_id)
    }

    /// All turns in prompt order: recency first, then current-scope matches,
    /// then global-scope matches.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.recent
            .iter()
            .chain(&self.current_scope)
            .chain(&self.global_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::{ConversationId, Turn, UserId};

    fn turn(content: &str) -> Turn {
        Turn::user(UserId::from("u1"), ConversationId::from("c1"), content)
    }

    #[test]
    fn empty_bundle_has_no_turns() {
        let bundle = ContextBundle::empty(5000);
        assert!(bundle.is_empty());
        assert_eq!(bundle.turn_count(), 0);
        assert_eq!(bundle.metadata.budget, 5000);
        assert!(!bundle.metadata.degraded);
    }

    #[test]
    fn contains_checks_all_sequences() {
        let mut bundle = ContextBundle::empty(5000);
        let a = turn("in recent");
        let b = turn("in global");
        let a_id = a.id.clone();
        let b_id = b.id.clone();
        bundle.recent.push(a);
        bundle.global_scope.push(b);

        assert!(bundle.contains(&a_id));
        assert!(bundle.contains(&b_id));
        assert!(!bundle.contains("nonexistent"));
        assert_eq!(bundle.turn_count(), 2);
    }

    #[test]
    fn iter_yields_prompt_order() {
        let mut bundle = ContextBundle::empty(5000);
        bundle.recent.push(turn("r"));
        bundle.current_scope.push(turn("c"));
        bundle.global_scope.push(turn("g"));

        let contents: Vec<&str> = bundle.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["r", "c", "g"]);
    }
}
