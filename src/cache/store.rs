//! Response cache storage.
//!
//! A bounded LRU map from request key to buffered response. Entries carry
//! an expiry deadline; an expired entry is treated as absent and removed
//! the next time it is read. There is no background eviction task, so the
//! store never spawns anything and lives entirely inside the process.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;

use super::config::CacheConfig;
use super::keys::ResponseKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Cached HTTP response.
#[derive(Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// Response cache storage.
pub struct ResponseStore {
    entries: RwLock<LruCache<ResponseKey, Entry>>,
}

impl ResponseStore {
    /// Create a new store sized from the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.response_limit_non_zero())),
        }
    }

    /// Look up a response, dropping the entry if its deadline has passed.
    pub fn get(&self, key: &ResponseKey) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.response.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Store a response for `ttl`, overwriting any previous entry.
    ///
    /// Returns the key displaced by LRU eviction, if any.
    pub fn set(
        &self,
        key: ResponseKey,
        response: CachedResponse,
        ttl: Duration,
    ) -> Option<ResponseKey> {
        let entry = Entry {
            response,
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, SOURCE, "set")
            .push(key, entry)
            .map(|(displaced, _)| displaced)
    }

    /// Remove one entry, expired or not.
    pub fn clear(&self, key: &ResponseKey) {
        rw_write(&self.entries, SOURCE, "clear").pop(key);
    }

    /// Number of stored entries, including any not yet read since expiry.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn sample_response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                "application/json".to_string(),
            )],
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn roundtrip_within_ttl() {
        let store = ResponseStore::new(&CacheConfig::default());
        let key = ResponseKey::from_parts("/api/waste-types", "");

        assert!(store.get(&key).is_none());

        store.set(key.clone(), sample_response("types"), Duration::from_secs(60));

        let cached = store.get(&key).expect("cached response");
        assert_eq!(cached.status, 200);
        assert_eq!(cached.body, Bytes::from("types"));

        store.clear(&key);
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn expired_entry_reads_as_absent_and_is_removed() {
        let store = ResponseStore::new(&CacheConfig::default());
        let key = ResponseKey::from_parts("/api/waste", "page=1");

        store.set(key.clone(), sample_response("stale"), Duration::ZERO);
        assert_eq!(store.len(), 1);

        assert!(store.get(&key).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn set_overwrites_and_refreshes_expiry() {
        let store = ResponseStore::new(&CacheConfig::default());
        let key = ResponseKey::from_parts("/api/dropboxes", "");

        store.set(key.clone(), sample_response("old"), Duration::ZERO);
        store.set(key.clone(), sample_response("new"), Duration::from_secs(60));

        let cached = store.get(&key).expect("refreshed entry");
        assert_eq!(cached.body, Bytes::from("new"));
    }

    #[test]
    fn lru_eviction_at_capacity() {
        let config = CacheConfig {
            response_limit: 2,
            ..Default::default()
        };
        let store = ResponseStore::new(&config);
        let ttl = Duration::from_secs(60);

        let key1 = ResponseKey::from_parts("/api/waste", "page=1");
        let key2 = ResponseKey::from_parts("/api/waste", "page=2");
        let key3 = ResponseKey::from_parts("/api/waste", "page=3");

        store.set(key1.clone(), sample_response("one"), ttl);
        store.set(key2.clone(), sample_response("two"), ttl);

        assert!(store.get(&key1).is_some());
        assert!(store.get(&key2).is_some());

        let evicted = store.set(key3.clone(), sample_response("three"), ttl);
        assert_eq!(evicted, Some(key1.clone()));

        assert!(store.get(&key1).is_none());
        assert!(store.get(&key2).is_some());
        assert!(store.get(&key3).is_some());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = ResponseStore::new(&CacheConfig::default());
        let key = ResponseKey::from_parts("/api/pickups", "");

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .entries
                .write()
                .expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        store.set(key.clone(), sample_response("after"), Duration::from_secs(60));
        assert!(store.get(&key).is_some());
    }
}
