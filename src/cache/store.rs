use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

/// One cached response. Replaced wholesale on overwrite, never mutated.
struct CacheEntry {
    data: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_stale(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// In-memory keyed store of previously fetched results.
///
/// Staleness is checked lazily on read; an expired entry is deleted at
/// that point and the lookup misses. There is no background sweep and no
/// size bound - an entry that is never read again lingers until teardown.
/// The mutex is held only for map operations, never across an await.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a value under `key`, overwriting any previous entry and
    /// stamping the current time. Values that fail to serialize are
    /// skipped; the cache is an optimization, not a source of truth.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "skipping cache write, value not serializable");
                return;
            }
        };
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Look up `key`. A stale entry is evicted and reported as a miss.
    /// A hit that fails to deserialize into `T` is also evicted (the key
    /// was reused with a different payload type).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;

        if entry.is_stale(Instant::now()) {
            debug!(key, "cache entry expired, evicting");
            entries.remove(key);
            return None;
        }

        match serde_json::from_value(entry.data.clone()) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(key, error = %e, "cache entry type mismatch, evicting");
                entries.remove(key);
                None
            }
        }
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let cache = ResponseCache::new();
        cache.set("alumni:list", &vec![1, 2, 3], Duration::from_secs(60));
        let hit: Option<Vec<i32>> = cache.get("alumni:list");
        assert_eq!(hit, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache = ResponseCache::new();
        let hit: Option<String> = cache.get("nothing");
        assert!(hit.is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = ResponseCache::new();
        cache.set("events", &"payload", Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));

        let hit: Option<String> = cache.get("events");
        assert!(hit.is_none());
        // The stale entry must be gone, not merely hidden.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache = ResponseCache::new();
        cache.set("k", &"old", Duration::from_secs(60));
        cache.set("k", &"new", Duration::from_secs(60));
        assert_eq!(cache.get::<String>("k"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ResponseCache::new();
        cache.set("a", &1, Duration::from_secs(60));
        cache.set("b", &2, Duration::from_secs(60));

        cache.delete("a");
        assert!(cache.get::<i32>("a").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_type_mismatch_evicts_entry() {
        let cache = ResponseCache::new();
        cache.set("k", &"not a number", Duration::from_secs(60));
        let hit: Option<i64> = cache.get("k");
        assert!(hit.is_none());
        assert_eq!(cache.len(), 0);
    }
}
