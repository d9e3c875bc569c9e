//! In-memory, time-expiring key/value store on top of [`moka`].
//!
//! Every entry carries its own TTL; a read past it is a miss. Expired entries
//! are reclaimed by moka's own housekeeping, so no sweeper task is needed.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

// A stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    ttl: Duration,
}

// Expires each entry `ttl` after its latest write; reads do not extend it.
struct PerEntryTtl;

impl<V> Expiry<String, Entry<V>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry<V>, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// A concurrent key → value map with per-entry expiry.
///
/// Writes overwrite unconditionally and restart the entry's TTL; racing
/// writers on the same key resolve last-write-wins.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flickr_gallery::cache::CacheStore;
///
/// let cache = CacheStore::new();
/// cache.put("albums", vec![1, 2, 3], Duration::from_secs(300));
/// assert_eq!(cache.get("albums"), Some(vec![1, 2, 3]));
/// assert_eq!(cache.get("album:42"), None);
/// ```
pub struct CacheStore<V> {
    inner: Cache<String, Entry<V>>,
}

impl<V: Clone + Send + Sync + 'static> Default for CacheStore<V> {
    fn default() -> Self {
        Self {
            inner: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> CacheStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, or `None` if it was never set or
    /// its TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value)
    }

    /// Stores `value` under `key`, replacing any previous entry. The entry
    /// expires `ttl` from now.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.inner.insert(key.into(), Entry { value, ttl });
    }

    /// Number of live entries, after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        usize::try_from(self.inner.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send + Sync + 'static> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const TTL: Duration = Duration::from_secs(300);
    const SHORT: Duration = Duration::from_millis(50);

    fn wait_past(ttl: Duration) {
        std::thread::sleep(ttl + Duration::from_millis(50));
    }

    #[test]
    fn get_after_put_returns_value() {
        let cache = CacheStore::new();
        cache.put("albums", "v1".to_string(), TTL);
        assert_eq!(cache.get("albums").as_deref(), Some("v1"));
    }

    #[test]
    fn never_set_is_absent() {
        let cache: CacheStore<String> = CacheStore::new();
        assert_eq!(cache.get("albums"), None);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = CacheStore::new();
        cache.put("album:1", 7u32, SHORT);
        assert_eq!(cache.get("album:1"), Some(7));

        wait_past(SHORT);
        assert_eq!(cache.get("album:1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_and_resets_ttl() {
        let cache = CacheStore::new();
        cache.put("k", 1u8, SHORT);
        cache.put("k", 2u8, TTL);
        wait_past(SHORT);
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn keys_expire_independently() {
        let cache = CacheStore::new();
        cache.put("a", 1u8, SHORT);
        cache.put("b", 2u8, TTL);
        wait_past(SHORT);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_on_distinct_keys() {
        let cache = Arc::new(CacheStore::new());
        let mut tasks = Vec::new();
        for i in 0..16u32 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move {
                cache.put(format!("album:{i}"), i, TTL);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        for i in 0..16u32 {
            assert_eq!(cache.get(&format!("album:{i}")), Some(i));
        }
        assert_eq!(cache.len(), 16);
    }
}
