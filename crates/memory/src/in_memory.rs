//! In-memory turn store — useful for testing and ephemeral sessions.

use crate::vector::rank_by_similarity;
use async_trait::async_trait;
use localbrain_core::error::StoreError;
use localbrain_core::store::{RetrievalScope, TurnStore};
use localbrain_core::turn::{ConversationId, Turn, UserId};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store keeping all turns in a Vec behind an async RwLock.
///
/// Positions are assigned on append: the next free index within the turn's
/// (user, conversation) pair, contiguous from 0.
#[derive(Clone)]
pub struct InMemoryTurnStore {
    turns: Arc<RwLock<Vec<Turn>>>,
}

impl InMemoryTurnStore {
    pub fn new() -> Self {
        Self {
            turns: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn same_thread(turn: &Turn, user_id: &UserId, conversation_id: &ConversationId) -> bool {
        &turn.user_id == user_id && &turn.conversation_id == conversation_id
    }
}

impl Default for InMemoryTurnStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TurnStore for InMemoryTurnStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, mut turn: Turn) -> Result<Turn, StoreError> {
        let mut turns = self.turns.write().await;
        let next_position = turns
            .iter()
            .filter(|t| Self::same_thread(t, &turn.user_id, &turn.conversation_id))
            .map(|t| t.position + 1)
            .max()
            .unwrap_or(0);
        turn.position = next_position;
        turns.push(turn.clone());
        Ok(turn)
    }

    async fn read_recent(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        let turns = self.turns.read().await;
        let mut matching: Vec<Turn> = turns
            .iter()
            .filter(|t| Self::same_thread(t, user_id, conversation_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.position.cmp(&a.position));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn nearest_by_vector(
        &self,
        user_id: &UserId,
        scope: RetrievalScope,
        query: &[f32],
        limit: usize,
        exclude: &[String],
    ) -> Result<Vec<Turn>, StoreError> {
        let turns = self.turns.read().await;
        let candidates: Vec<Turn> = turns
            .iter()
            .filter(|t| &t.user_id == user_id)
            .filter(|t| match &scope {
                RetrievalScope::Conversation(id) => &t.conversation_id == id,
                RetrievalScope::OtherConversations(id) => &t.conversation_id != id,
            })
            .cloned()
            .collect();
        Ok(rank_by_similarity(&candidates, query, limit, exclude))
    }

    async fn count(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<usize, StoreError> {
        let turns = self.turns.read().await;
        Ok(turns
            .iter()
            .filter(|t| Self::same_thread(t, user_id, conversation_id))
            .count())
    }

    async fn purge_conversation(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<usize, StoreError> {
        let mut turns = self.turns.write().await;
        let len_before = turns.len();
        turns.retain(|t| !Self::same_thread(t, user_id, conversation_id));
        Ok(len_before - turns.len())
    }
}
