//! Content-derived cache keys.

use sha2::{Digest, Sha256};
use std::fmt;

/// Domain-separation prefix. Bump the version to invalidate every key.
const KEY_DOMAIN: &[u8] = b"parrot-tts-key-v1:";

/// Hex-encoded SHA-256 digest identifying a (voice, text) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the cache key for a voice and text.
///
/// Each field is hashed behind an 8-byte big-endian length prefix, so no two
/// distinct pairs share an encoding (`("ab", "c")` and `("a", "bc")` differ).
pub fn cache_key(voice_id: &str, text: &str) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(KEY_DOMAIN);
    for field in [voice_id, text] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    CacheKey(hex::encode(hasher.finalize()))
}
