//! The context assembler — recency window plus dual-scope semantic
//! retrieval, deduplicated and trimmed to a token budget.
//!
//! # Degradation
//!
//! The assembler distinguishes fatal from degradable failures:
//! - Turn store unavailable (or a recency read past its deadline) fails the
//!   whole call — without the store not even the recency window exists.
//! - An embedding oracle failure or timeout skips semantic retrieval
//!   entirely; the bundle comes back recency-only with `degraded` set.
//! - A single scope query past its deadline empties that scope only.

use crate::token;
use localbrain_config::AssemblerConfig;
use localbrain_core::bundle::{BundleMetadata, ContextBundle, DropInfo};
use localbrain_core::embedder::Embedder;
use localbrain_core::error::{AssembleError, StoreError};
use localbrain_core::store::{RetrievalScope, TurnStore};
use localbrain_core::turn::{ConversationId, Turn, UserId};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// All inputs for a single assembly call. Limits default to the assembler's
/// configuration; set a field to override per request.
#[derive(Debug, Clone)]
pub struct AssembleRequest {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub query_text: String,
    /// Override for the configured number of recent exchanges.
    pub recent_limit: Option<usize>,
    /// Override for the configured current-scope match count.
    pub current_scope_limit: Option<usize>,
    /// Override for the configured global-scope match count.
    pub global_scope_limit: Option<usize>,
    /// Override for the configured token budget.
    pub token_budget: Option<usize>,
}

impl AssembleRequest {
    pub fn new(
        user_id: UserId,
        conversation_id: ConversationId,
        query_text: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            conversation_id,
            query_text: query_text.into(),
            recent_limit: None,
            current_scope_limit: None,
            global_scope_limit: None,
            token_budget: None,
        }
    }
}

/// The context assembler. Holds no mutable state — every call is
/// independent and may run fully in parallel with any other.
pub struct ContextAssembler {
    store: Arc<dyn TurnStore>,
    embedder: Arc<dyn Embedder>,
    config: AssemblerConfig,
}

impl ContextAssembler {
    pub fn new(
        store: Arc<dyn TurnStore>,
        embedder: Arc<dyn Embedder>,
        config: AssemblerConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Assemble a bounded, ranked context bundle for the given query.
    ///
    /// # Algorithm
    ///
    /// 1. Read the recency window and compute the query embedding,
    ///    concurrently, each under its own deadline
    /// 2. Fan out the two semantic scope queries, concurrently, excluding
    ///    recency-window turns
    /// 3. Deduplicate after all reads return (recency > current > global)
    /// 4. Trim to the token budget, lowest-priority sequence first
    pub async fn assemble(
        &self,
        request: AssembleRequest,
    ) -> Result<ContextBundle, AssembleError> {
        let query = request.query_text.trim();
        if query.is_empty() {
            return Err(AssembleError::InvalidRequest("query text is empty".into()));
        }

        let recent_limit = request.recent_limit.unwrap_or(self.config.recent_limit);
        let current_limit = request
            .current_scope_limit
            .unwrap_or(self.config.current_scope_limit);
        let global_limit = request
            .global_scope_limit
            .unwrap_or(self.config.global_scope_limit);
        let budget = request.token_budget.unwrap_or(self.config.token_budget);

        let store_deadline = self.config.store_timeout();
        let oracle_deadline = self.config.oracle_timeout();

        // Recency read and embedding are independent; issue both at once.
        let (recency_result, embed_result) = tokio::join!(
            timeout(
                store_deadline,
                self.store.read_recent(
                    &request.user_id,
                    &request.conversation_id,
                    2 * recent_limit,
                ),
            ),
            timeout(oracle_deadline, self.embedder.embed(query)),
        );

        // The recency window is load-bearing: any failure here is fatal.
        let mut recent = match recency_result {
            Ok(Ok(turns)) => turns,
            Ok(Err(e)) => return Err(AssembleError::Store(e)),
            Err(_) => {
                return Err(AssembleError::Timeout {
                    elapsed_ms: store_deadline.as_millis() as u64,
                });
            }
        };
        // Store returns newest-first; the prompt wants chronological order.
        recent.reverse();

        let mut degraded_reasons: Vec<String> = Vec::new();
        let mut current_scope: Vec<Turn> = Vec::new();
        let mut global_scope: Vec<Turn> = Vec::new();

        let query_vector = match embed_result {
            Ok(Ok(vector)) => Some(vector),
            Ok(Err(e)) => {
                warn!(error = %e, "embedding oracle failed; assembling recency-only context");
                degraded_reasons.push(format!("embedding oracle failed: {e}"));
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = oracle_deadline.as_millis() as u64,
                    "embedding oracle timed out; assembling recency-only context"
                );
                degraded_reasons.push("embedding oracle timed out".into());
                None
            }
        };

        if let Some(vector) = query_vector {
            let exclude: Vec<String> = recent.iter().map(|t| t.id.clone()).collect();

            let (current_result, global_result) = tokio::join!(
                timeout(
                    store_deadline,
                    self.store.nearest_by_vector(
                        &request.user_id,
                        RetrievalScope::Conversation(request.conversation_id.clone()),
                        &vector,
                        current_limit,
                        &exclude,
                    ),
                ),
                timeout(
                    store_deadline,
                    self.store.nearest_by_vector(
                        &request.user_id,
                        RetrievalScope::OtherConversations(request.conversation_id.clone()),
                        &vector,
                        global_limit,
                        &exclude,
                    ),
                ),
            );

            current_scope = Self::unwrap_scope(current_result, "current", &mut degraded_reasons)?;
            global_scope = Self::unwrap_scope(global_result, "global", &mut degraded_reasons)?;

            // Dedup runs only after every read has returned: recency wins
            // over current scope (enforced via `exclude` above), current
            // over global.
            let selected: Vec<&str> = recent
                .iter()
                .chain(&current_scope)
                .map(|t| t.id.as_str())
                .collect();
            global_scope.retain(|t| !selected.contains(&t.id.as_str()));
            global_scope.truncate(global_limit);
        }

        let drops = Self::trim_to_budget(
            &mut recent,
            &mut current_scope,
            &mut global_scope,
            budget,
        );

        let estimated_tokens = token::estimate_turns_tokens(&recent)
            + token::estimate_turns_tokens(&current_scope)
            + token::estimate_turns_tokens(&global_scope)
            + token::BUNDLE_OVERHEAD_TOKENS;

        let degraded = !degraded_reasons.is_empty();
        debug!(
            recent = recent.len(),
            current = current_scope.len(),
            global = global_scope.len(),
            estimated_tokens,
            degraded,
            "context assembled"
        );

        Ok(ContextBundle {
            recent,
            current_scope,
            global_scope,
            estimated_tokens,
            metadata: BundleMetadata {
                budget,
                degraded,
                degraded_reason: if degraded {
                    Some(degraded_reasons.join("; "))
                } else {
                    None
                },
                drops,
            },
        })
    }

    /// A scope query that missed its deadline degrades that scope to empty;
    /// a store error stays fatal.
    fn unwrap_scope(
        result: Result<Result<Vec<Turn>, StoreError>, tokio::time::error::Elapsed>,
        scope_name: &str,
        degraded_reasons: &mut Vec<String>,
    ) -> Result<Vec<Turn>, AssembleError> {
        match result {
            Ok(Ok(turns)) => Ok(turns),
            Ok(Err(e)) => Err(AssembleError::Store(e)),
            Err(_) => {
                warn!(scope = scope_name, "scope retrieval timed out; scope degraded to empty");
                degraded_reasons.push(format!("{scope_name}-scope retrieval timed out"));
                Ok(Vec::new())
            }
        }
    }

    /// Drop turns until the bundle fits the budget, from the oldest end of
    /// the lowest-priority non-empty sequence: global scope first, then
    /// current scope, then — last resort — the recency window. The most
    /// recent exchange (final two recency turns) is never dropped.
    fn trim_to_budget(
        recent: &mut Vec<Turn>,
        current_scope: &mut Vec<Turn>,
        global_scope: &mut Vec<Turn>,
        budget: usize,
    ) -> Vec<DropInfo> {
        let mut dropped = [(0usize, 0usize); 3]; // (turns, tokens) per sequence

        loop {
            let total = token::estimate_turns_tokens(recent)
                + token::estimate_turns_tokens(current_scope)
                + token::estimate_turns_tokens(global_scope)
                + token::BUNDLE_OVERHEAD_TOKENS;
            if total <= budget {
                break;
            }

            let victim = if !global_scope.is_empty() {
                (Self::remove_oldest(global_scope), 2)
            } else if !current_scope.is_empty() {
                (Self::remove_oldest(current_scope), 1)
            } else if recent.len() > 2 {
                // Chronological order: the oldest recency turn is at the front.
                (recent.remove(0), 0)
            } else {
                break;
            };
            let (turn, seq) = victim;
            dropped[seq].0 += 1;
            dropped[seq].1 += token::estimate_turn_tokens(&turn);
        }

        let names = ["recent", "current_scope", "global_scope"];
        names
            .iter()
            .zip(dropped)
            .filter(|(_, (turns, _))| *turns > 0)
            .map(|(name, (turns_dropped, tokens_dropped))| DropInfo {
                sequence: (*name).into(),
                turns_dropped,
                tokens_dropped,
            })
            .collect()
    }

    /// Remove and return the turn with the smallest position.
    fn remove_oldest(turns: &mut Vec<Turn>) -> Turn {
        let oldest = turns
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.position)
            .map(|(i, _)| i)
            .unwrap_or(0);
        turns.remove(oldest)
    }
}
