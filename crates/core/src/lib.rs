//! # localbrain core
//!
//! Domain types, traits, and error definitions for the localbrain
//! context-assembly and response-cache core. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The two external capabilities the core consumes — computing an embedding
//! for a text span, and reading/writing chat turns — are defined as traits
//! here. Implementations live in their respective crates. This enables:
//! - Testing with deterministic fakes instead of a real model or database
//! - Swapping storage backends via configuration
//! - A clean dependency graph (all crates depend inward on core)

pub mod bundle;
pub mod embedder;
pub mod error;
pub mod store;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use bundle::{BundleMetadata, ContextBundle, DropInfo};
pub use embedder::{Embedder, EMBED_DIM};
pub use error::{AssembleError, ConfigError, Error, OracleError, Result, StoreError};
pub use store::{RetrievalScope, TurnStore};
pub use turn::{ConversationId, Role, Turn, UserId};
