//! Turn domain types.
//!
//! A [`Turn`] is one message in a conversation: a user question or an
//! assistant answer. Turns are append-only — once written to a store they
//! are never updated, only read back for context assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an end user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// A single turn in a conversation.
///
/// Position indices within a (user, conversation) pair are contiguous from 0
/// and strictly increasing; a user turn and its answering assistant turn
/// occupy consecutive indices. The store assigns positions on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// The user who owns the conversation
    pub user_id: UserId,

    /// The conversation this turn belongs to
    pub conversation_id: ConversationId,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Zero-based position within the conversation, assigned on append
    pub position: u64,

    /// Timestamp
    pub created_at: DateTime<Utc>,

    /// Optional embedding vector (stored as blob in DB)
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Turn {
    /// Create a new user turn. Position is assigned by the store on append.
    pub fn user(
        user_id: UserId,
        conversation_id: ConversationId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(user_id, conversation_id, Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(
        user_id: UserId,
        conversation_id: ConversationId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(user_id, conversation_id, Role::Assistant, content)
    }

    fn new(
        user_id: UserId,
        conversation_id: ConversationId,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            conversation_id,
            role,
            content: content.into(),
            position: 0,
            created_at: Utc::now(),
            embedding: None,
        }
    }

    /// Attach an embedding vector.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}
