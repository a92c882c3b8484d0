//! Response caching for localbrain.
//!
//! Memoizes model answers keyed by a request fingerprint so that identical
//! requests never trigger redundant model calls. The cache is a bounded
//! in-memory structure with least-recently-used eviction, optional
//! time-to-live expiry, and hit/miss/eviction counters. It carries no
//! persistence guarantee: a restart silently discards all entries, keeping
//! the cache out of the correctness-critical path — every answer remains
//! derivable from source truth through the assembler and a model call.

pub mod fingerprint;
pub mod response_cache;

pub use fingerprint::Fingerprint;
pub use response_cache::{CacheStats, ResponseCache};
