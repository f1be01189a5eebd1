//! API key set model.
//!
//! All registered keys live together as one JSON array of strings. The array
//! keeps insertion order, and a stored value that does not decode is read as
//! an empty set so authentication keeps working.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Ordered collection of registered API keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySet(Vec<String>);

impl KeySet {
    /// Decode a stored value. Anything that is not a JSON array of strings
    /// yields the empty set.
    pub fn decode(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Append without a uniqueness check; callers test `contains` first.
    pub fn push(&mut self, key: impl Into<String>) {
        self.0.push(key.into());
    }

    /// Drop every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.0.retain(|k| k != key);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for KeySet {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

/// Short SHA-256 fingerprint of a key, safe to put in logs.
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..4])
}
