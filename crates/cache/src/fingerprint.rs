//! Request fingerprints.
//!
//! A fingerprint identifies semantically identical requests: two requests
//! with the same conversation, archetype, and (whitespace-trimmed) query
//! text are eligible for the same cached answer. The digest is a SHA-256
//! over the fields in a fixed order with length prefixes, so no combination
//! of values can collide by concatenation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An opaque, stable cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from the request's identifying parts.
    ///
    /// Order-sensitive: the conversation id, archetype name, and trimmed
    /// query text are hashed in that order, each preceded by its byte
    /// length.
    pub fn compute(conversation_id: &str, archetype: &str, query_text: &str) -> Self {
        let mut hasher = Sha256::new();
        for part in [conversation_id, archetype, query_text.trim()] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        let digest = hasher.finalize();
        Self(hex_encode(&digest))
    }

    /// Wrap a pre-built key the caller derived elsewhere.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Log-friendly short form. Char-wise: raw keys from `from_raw` are
        // not guaranteed to be ASCII.
        for c in self.0.chars().take(16) {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
