//! One-way identity hashing.
//!
//! The raw submitter identity never reaches storage or logs. Everything that
//! refers to a person does so through the SHA-256 token computed here: store
//! keys, confession records, log fields. The mapping is recomputable from the
//! raw identity but not invertible from the token.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque, irreversible token standing in for a submitter identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Returns the raw hex token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display slice used as the anonymous author label in published
    /// confessions. A label, not a key; uniqueness is not guaranteed.
    pub fn anon_tag(&self) -> &str {
        &self.0[..6]
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic one-way mapping from raw identity to [`IdentityToken`].
pub struct IdentityHasher;

impl IdentityHasher {
    /// Hashes a raw identity into its storage token. Pure and deterministic.
    pub fn token(raw_identity: &str) -> IdentityToken {
        let digest = Sha256::digest(raw_identity.as_bytes());
        IdentityToken(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}
