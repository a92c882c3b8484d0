//! Error types for the localbrain domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Degraded outcomes are deliberately *not* errors: an embedding oracle that
//! times out lowers context quality but must not fail the request, so that
//! condition travels in [`crate::bundle::BundleMetadata`] instead.

use thiserror::Error;

/// The top-level error type for all localbrain operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Turn store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Embedding oracle errors ---
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // --- Context assembly errors ---
    #[error("Assembly error: {0}")]
    Assemble(#[from] AssembleError),

    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Turn store failures. Always fatal for the call that hit them: without the
/// store not even the recency window can be produced.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Turn store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Unknown conversation: {0}")]
    UnknownConversation(String),
}

/// Embedding oracle failures. Non-fatal: the assembler degrades to a
/// recency-only bundle when it sees one of these.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("Embedding oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Embedding has wrong dimension: expected {expected}, got {got}")]
    WrongDimension { expected: usize, got: usize },
}

/// Context assembly failures. Budget exhaustion is *not* represented here —
/// trimming always succeeds by construction and can only shrink the bundle.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Store error during assembly: {0}")]
    Store(#[from] StoreError),

    #[error("Assembly deadline exceeded after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Invalid assemble request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
