//! The engine facade — the seam an HTTP layer or channel adapter calls into.
//!
//! Composes the context assembler and the response cache behind one handle.
//! The intended request flow:
//!
//! 1. `fingerprint` the incoming request and `cache_lookup`
//! 2. on a miss, `assemble` the context bundle, call the model, then
//!    `cache_store` the answer
//! 3. periodically `cache_clear_expired` and expose `cache_stats`
//!
//! The engine owns no model client: generating the answer between steps 2's
//! assemble and store belongs to the caller.

use localbrain_cache::{CacheStats, Fingerprint, ResponseCache};
use localbrain_config::AppConfig;
use localbrain_context::assembler::{AssembleRequest, ContextAssembler};
use localbrain_core::bundle::ContextBundle;
use localbrain_core::embedder::Embedder;
use localbrain_core::error::AssembleError;
use localbrain_core::store::TurnStore;
use localbrain_core::turn::ConversationId;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One handle over assembly and caching. Cheap to clone and share.
#[derive(Clone)]
pub struct ContextEngine {
    assembler: Arc<ContextAssembler>,
    cache: ResponseCache,
}

impl ContextEngine {
    pub fn new(assembler: ContextAssembler, cache: ResponseCache) -> Self {
        Self {
            assembler: Arc::new(assembler),
            cache,
        }
    }

    /// Wire up an engine from configuration and the two capability
    /// implementations.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn TurnStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        debug!(
            store = store.name(),
            embedder = embedder.name(),
            "building context engine"
        );
        Self::new(
            ContextAssembler::new(store, embedder, config.assembler.clone()),
            ResponseCache::new(config.cache.clone()),
        )
    }

    /// Assemble a context bundle for a query. See
    /// [`ContextAssembler::assemble`] for the algorithm and failure modes.
    pub async fn assemble(
        &self,
        request: AssembleRequest,
    ) -> Result<ContextBundle, AssembleError> {
        self.assembler.assemble(request).await
    }

    /// Fingerprint a request for cache keying.
    pub fn fingerprint(
        &self,
        conversation_id: &ConversationId,
        archetype: &str,
        query_text: &str,
    ) -> Fingerprint {
        Fingerprint::compute(conversation_id.as_str(), archetype, query_text)
    }

    pub fn cache_lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.cache.lookup(fingerprint)
    }

    pub fn cache_store(
        &self,
        fingerprint: Fingerprint,
        answer: impl Into<String>,
        ttl: Option<Duration>,
    ) {
        self.cache.store(fingerprint, answer, ttl);
    }

    pub fn cache_clear(&self) {
        self.cache.clear();
    }

    pub fn cache_clear_expired(&self) -> usize {
        self.cache.clear_expired()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
