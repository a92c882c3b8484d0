//! Embedder trait — the abstraction over the embedding oracle.
//!
//! An Embedder turns a text span into a fixed-length vector. The real
//! implementation calls an external model with latency in the tens to
//! hundreds of milliseconds; callers must wrap invocations in a deadline.
//!
//! Implementations: HTTP-backed providers (out of scope here), deterministic
//! fakes for tests.

use crate::error::OracleError;
use async_trait::async_trait;

/// Expected embedding dimensionality.
///
/// Matches the 768-dimensional vectors the backing store is indexed with.
pub const EMBED_DIM: usize = 768;

/// The embedding oracle capability.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g., "google-768", "fake").
    fn name(&self) -> &str;

    /// Compute an embedding vector for the given text.
    ///
    /// Implementations should return [`OracleError::WrongDimension`] rather
    /// than a vector whose length differs from what the store is indexed
    /// with.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, OracleError>;
}
