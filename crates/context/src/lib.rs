//! Context assembly for localbrain.
//!
//! For every inbound message the assembler decides exactly which prior
//! material enters the prompt, under a bounded token budget:
//!
//! | Sequence | Source | Trim Strategy |
//! |----------|--------|---------------|
//! | 1. Recency window | last N exchanges, chronological | trimmed only as a last resort; final exchange never dropped |
//! | 2. Current scope | semantic matches, same conversation | oldest dropped after global is empty |
//! | 3. Global scope | semantic matches, other conversations | oldest dropped first |
//!
//! The recency window is unconditional — immediate conversational continuity
//! must never be lost to a ranking algorithm's error. Semantic retrieval is
//! best-effort: an embedding oracle failure degrades the bundle to
//! recency-only instead of failing the request.

pub mod assembler;
pub mod token;

pub use assembler::{AssembleRequest, ContextAssembler};
