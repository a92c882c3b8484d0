//! End-to-end flows through the engine facade: cache miss, assembly,
//! store, hit — with deterministic in-memory fakes.

use async_trait::async_trait;
use localbrain_config::AppConfig;
use localbrain_context::AssembleRequest;
use localbrain_core::embedder::Embedder;
use localbrain_core::error::OracleError;
use localbrain_core::store::TurnStore;
use localbrain_core::turn::{ConversationId, Turn, UserId};
use localbrain_engine::ContextEngine;
use localbrain_memory::InMemoryTurnStore;
use std::sync::Arc;
use std::time::Duration;

struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    fn name(&self) -> &str {
        "fake"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, OracleError> {
        Ok(vec![1.0, 0.0])
    }
}

struct SlowEmbedder;

#[async_trait]
impl Embedder for SlowEmbedder {
    fn name(&self) -> &str {
        "slow"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, OracleError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![1.0, 0.0])
    }
}

fn user() -> UserId {
    UserId::from("u1")
}

async fn seed(store: &InMemoryTurnStore, conversation: &ConversationId, exchanges: usize) {
    for i in 0..exchanges {
        store
            .append(
                Turn::user(user(), conversation.clone(), format!("question {i}"))
                    .with_embedding(vec![1.0, 0.0]),
            )
            .await
            .unwrap();
        store
            .append(
                Turn::assistant(user(), conversation.clone(), format!("answer {i}"))
                    .with_embedding(vec![1.0, 0.0]),
            )
            .await
            .unwrap();
    }
}

fn engine_over(store: Arc<InMemoryTurnStore>, embedder: Arc<dyn Embedder>) -> ContextEngine {
    ContextEngine::from_config(&AppConfig::default(), store, embedder)
}

#[tokio::test]
async fn miss_assemble_store_hit_round_trip() {
    let store = Arc::new(InMemoryTurnStore::new());
    let conversation = ConversationId::from("c1");
    seed(&store, &conversation, 2).await;

    let engine = engine_over(store, Arc::new(FakeEmbedder));
    let fp = engine.fingerprint(&conversation, "analyst", "what did we discuss?");

    // First pass: cold cache, full assembly, then store the model answer.
    assert!(engine.cache_lookup(&fp).is_none());

    let bundle = engine
        .assemble(AssembleRequest::new(
            user(),
            conversation.clone(),
            "what did we discuss?",
        ))
        .await
        .unwrap();
    assert_eq!(bundle.recent.len(), 4);
    assert!(!bundle.metadata.degraded);

    engine.cache_store(fp.clone(), "we discussed turns", None);

    // Second pass: same request, answer comes straight from the cache.
    assert_eq!(
        engine.cache_lookup(&fp).as_deref(),
        Some("we discussed turns")
    );

    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.total_requests, 2);
}

#[tokio::test]
async fn identical_request_twice_only_hits_after_the_first_store() {
    let store = Arc::new(InMemoryTurnStore::new());
    let conversation = ConversationId::from("c1");
    let engine = engine_over(store, Arc::new(FakeEmbedder));

    let fp = engine.fingerprint(&conversation, "poet", "write a haiku");
    engine.cache_store(fp.clone(), "cache lines in spring", None);

    assert!(engine.cache_lookup(&fp).is_some());
    assert!(engine.cache_lookup(&fp).is_some());

    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 0);
}

#[tokio::test]
async fn same_query_different_archetype_misses() {
    let store = Arc::new(InMemoryTurnStore::new());
    let conversation = ConversationId::from("c1");
    let engine = engine_over(store, Arc::new(FakeEmbedder));

    let analyst = engine.fingerprint(&conversation, "analyst", "summarize");
    let poet = engine.fingerprint(&conversation, "poet", "summarize");
    assert_ne!(analyst, poet);

    engine.cache_store(analyst, "a table of findings", None);
    assert!(engine.cache_lookup(&poet).is_none());
}

#[tokio::test(start_paused = true)]
async fn oracle_timeout_still_produces_a_usable_bundle() {
    let store = Arc::new(InMemoryTurnStore::new());
    let conversation = ConversationId::from("c1");
    seed(&store, &conversation, 3).await;

    let engine = engine_over(store, Arc::new(SlowEmbedder));
    let bundle = engine
        .assemble(AssembleRequest::new(
            user(),
            conversation.clone(),
            "anything",
        ))
        .await
        .unwrap();

    // Semantic scopes are gone but the conversation continues.
    assert_eq!(bundle.recent.len(), 6);
    assert!(bundle.current_scope.is_empty());
    assert!(bundle.global_scope.is_empty());
    assert!(bundle.metadata.degraded);
}

#[tokio::test]
async fn cache_maintenance_through_the_facade() {
    let store = Arc::new(InMemoryTurnStore::new());
    let conversation = ConversationId::from("c1");
    let engine = engine_over(store, Arc::new(FakeEmbedder));

    let stale = engine.fingerprint(&conversation, "analyst", "old question");
    let live = engine.fingerprint(&conversation, "analyst", "new question");
    engine.cache_store(stale, "stale answer", Some(Duration::ZERO));
    engine.cache_store(live.clone(), "live answer", None);

    assert_eq!(engine.cache_clear_expired(), 1);
    assert!(engine.cache_lookup(&live).is_some());

    engine.cache_clear();
    assert_eq!(engine.cache_stats().size, 0);
    assert!(engine.cache_lookup(&live).is_none());
}
