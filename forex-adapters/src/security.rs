//! Security utilities for API key hashing and verification.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hashes an API key using SHA-256.
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// The set of API keys accepted by the gateway, held as SHA-256 hashes only.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    hashes: Vec<String>,
}

impl ApiKeys {
    /// Hashes raw keys (as read from configuration). Blank entries are skipped.
    pub fn from_raw<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hashes = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| hash_api_key(&k))
            .collect();
        Self { hashes }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Checks `candidate` against every stored hash without short-circuiting.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate_hash = hash_api_key(candidate);
        self.hashes.iter().fold(false, |found, stored| {
            found | bool::from(candidate_hash.as_bytes().ct_eq(stored.as_bytes()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_hashing() {
        let key = "sk_test_abc123";
        let hash = hash_api_key(key);

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key(key));
    }

    #[test]
    fn test_key_set_verification() {
        let keys = ApiKeys::from_raw(["sk_live_one", " sk_live_two ", ""]);

        assert_eq!(keys.len(), 2);
        assert!(keys.verify("sk_live_one"));
        assert!(keys.verify("sk_live_two"));
        assert!(!keys.verify("sk_live_three"));
        assert!(!keys.verify(""));
    }

    #[test]
    fn test_empty_key_set_rejects_everything() {
        let keys = ApiKeys::default();
        assert!(keys.is_empty());
        assert!(!keys.verify("anything"));
    }
}
