//! Cache key definitions.
//!
//! A cached response is keyed by its request path plus a hash of the raw
//! query string, so the same path with different paging or filters lands
//! in separate entries.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Key for one cached GET response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub path: String,
    pub query_hash: u64,
}

impl ResponseKey {
    /// Build a key from the request path and raw query string.
    ///
    /// An absent query string hashes as the empty string, so `/api/waste`
    /// and `/api/waste?` share an entry.
    pub fn from_parts(path: &str, query: &str) -> Self {
        Self {
            path: path.to_string(),
            query_hash: hash_query(query),
        }
    }
}

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash a query string for response cache key generation.
pub fn hash_query(query: &str) -> u64 {
    hash_value(&query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hash_consistency() {
        let key1 = ResponseKey::from_parts("/api/waste", "page=2");
        let key2 = ResponseKey::from_parts("/api/waste", "page=2");

        assert_eq!(key1, key2);
        assert_eq!(hash_value(&key1), hash_value(&key2));
    }

    #[test]
    fn different_queries_produce_different_keys() {
        let key1 = ResponseKey::from_parts("/api/waste", "page=1");
        let key2 = ResponseKey::from_parts("/api/waste", "page=2");
        assert_ne!(key1, key2);
    }

    #[test]
    fn different_paths_produce_different_keys() {
        let key1 = ResponseKey::from_parts("/api/waste-types", "");
        let key2 = ResponseKey::from_parts("/api/dropboxes", "");
        assert_ne!(key1, key2);
    }
}
