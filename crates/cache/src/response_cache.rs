//! The bounded response cache.
//!
//! A single mutex guards the entry map and the counters — the operations
//! under it are map lookups and inserts, never I/O, so contention stays
//! negligible. The lock is never held across an await point; this module is
//! entirely synchronous.
//!
//! Eviction follows least-recently-*accessed* order, not insertion order:
//! repeated questions in an active conversation are far more likely to recur
//! than one-off historical queries, so a lookup counts as a touch.

use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use localbrain_config::CacheConfig;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// A cached answer and its bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry {
    answer: String,
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    hits: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Point-in-time snapshot of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_requests: u64,
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    total_requests: u64,
}

struct CacheInner {
    entries: LruCache<Fingerprint, CacheEntry>,
    counters: Counters,
}

/// Public handle to the cache. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<CacheInner>>,
    default_ttl: Option<Duration>,
}

impl ResponseCache {
    /// Create a cache from configuration. Capacity must be validated by the
    /// caller (`CacheConfig::validate`); a zero capacity falls back to one
    /// entry rather than panicking.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                counters: Counters::default(),
            })),
            default_ttl: config.default_ttl(),
        }
    }

    /// Look up a cached answer. A live hit refreshes the entry's LRU
    /// position; an expired entry is removed and reported as a miss.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        let now = Utc::now();
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.counters.total_requests += 1;

        match inner.entries.get_mut(fingerprint) {
            None => {
                inner.counters.misses += 1;
                debug!(%fingerprint, "cache miss");
                None
            }
            Some(entry) if !entry.is_expired(now) => {
                entry.hits += 1;
                let age_secs = (now - entry.created_at).num_seconds();
                let idle_secs = (now - entry.last_accessed).num_seconds();
                entry.last_accessed = now;
                inner.counters.hits += 1;
                debug!(%fingerprint, hits = entry.hits, age_secs, idle_secs, "cache hit");
                Some(entry.answer.clone())
            }
            Some(_) => {
                inner.entries.pop(fingerprint);
                inner.counters.misses += 1;
                inner.counters.evictions += 1;
                debug!(%fingerprint, "cache entry expired and removed");
                None
            }
        }
    }

    /// Store an answer. Overwrites any live entry for the same fingerprint.
    /// At capacity, the least-recently-accessed entry is evicted. `None`
    /// TTL falls back to the configured default; with no default the entry
    /// never expires.
    pub fn store(&self, fingerprint: Fingerprint, answer: impl Into<String>, ttl: Option<Duration>) {
        let now = Utc::now();
        let expires_at = ttl
            .or(self.default_ttl)
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| now + d);
        let entry = CacheEntry {
            answer: answer.into(),
            created_at: now,
            last_accessed: now,
            expires_at,
            hits: 0,
        };

        let mut inner = self.inner.lock().unwrap();
        if let Some((displaced, _)) = inner.entries.push(fingerprint.clone(), entry) {
            // `push` returns either the overwritten same-key entry or the
            // evicted LRU victim; only the latter is an eviction.
            if displaced != fingerprint {
                inner.counters.evictions += 1;
                debug!(victim = %displaced, "cache capacity eviction");
            }
        }
        debug!(%fingerprint, "cached response");
    }

    /// Remove all entries. Counters are preserved.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let cleared = inner.entries.len();
        inner.entries.clear();
        info!(cleared, "cache cleared");
    }

    /// Proactively remove every expired entry without waiting for a lookup
    /// to trigger lazy removal. Returns the number removed.
    pub fn clear_expired(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();
        let expired: Vec<Fingerprint> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(fp, _)| fp.clone())
            .collect();
        for fp in &expired {
            inner.entries.pop(fp);
        }
        inner.counters.evictions += expired.len() as u64;
        if !expired.is_empty() {
            info!(cleared = expired.len(), "expired cache entries swept");
        }
        expired.len()
    }

    /// Snapshot the counters. Holds the lock only for the copy.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            total_requests: inner.counters.total_requests,
            size: inner.entries.len(),
        }
    }

    /// Zero all counters and drop all entries.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.counters = Counters::default();
        info!("cache statistics reset");
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
