//! TurnStore trait — the abstraction over turn persistence.
//!
//! The store is an append-only, per-user, per-conversation ordered log of
//! turns, each optionally carrying an embedding. It supports ordered range
//! reads (for the recency window) and nearest-neighbor reads by vector
//! similarity (for semantic retrieval).
//!
//! Implementations: in-memory (tests, ephemeral sessions); a pgvector-backed
//! store would live behind the same trait but is out of scope here.

use crate::error::StoreError;
use crate::turn::{ConversationId, Turn, UserId};
use async_trait::async_trait;

/// The retrieval boundary for semantic search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalScope {
    /// Only the named conversation.
    Conversation(ConversationId),
    /// All of the user's conversations *except* the named one.
    OtherConversations(ConversationId),
}

/// The turn persistence capability.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "pgvector").
    fn name(&self) -> &str;

    /// Append a turn, assigning it the next position in its conversation.
    /// Returns the stored turn with its position filled in.
    async fn append(&self, turn: Turn) -> std::result::Result<Turn, StoreError>;

    /// Read the most recent `limit` turns of a conversation, newest first
    /// (position descending).
    async fn read_recent(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> std::result::Result<Vec<Turn>, StoreError>;

    /// Read the `limit` turns nearest to `query` by cosine similarity within
    /// the given scope, skipping any turn whose id is in `exclude`. Ties are
    /// broken by more-recent position first. Turns without embeddings are
    /// never returned.
    async fn nearest_by_vector(
        &self,
        user_id: &UserId,
        scope: RetrievalScope,
        query: &[f32],
        limit: usize,
        exclude: &[String],
    ) -> std::result::Result<Vec<Turn>, StoreError>;

    /// Number of turns in a conversation.
    async fn count(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> std::result::Result<usize, StoreError>;

    /// Delete every turn of a conversation. Returns the number removed.
    /// This is the explicit purge path; nothing else deletes turns.
    async fn purge_conversation(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> std::result::Result<usize, StoreError>;
}
