//! Turn store implementations for localbrain.

pub mod in_memory;
pub mod vector;

pub use in_memory::InMemoryTurnStore;
pub use vector::{cosine_similarity, rank_by_similarity};
