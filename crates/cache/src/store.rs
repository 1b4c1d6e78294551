use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Entry<V> {
    value: V,
    tags: Vec<String>,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Point-in-time counters for a [`TagCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidated: u64,
    pub entries: usize,
}

/// In-memory key/value cache whose entries carry tags for bulk invalidation.
///
/// Safe to share across request tasks. A fill that started before an
/// invalidation may still land afterwards; readers tolerate that staleness.
pub struct TagCache<V> {
    enabled: bool,
    ttl: Option<Duration>,
    entries: DashMap<String, Entry<V>>,
    tag_index: DashMap<String, HashSet<String>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidated: AtomicU64,
}

impl<V: Clone> TagCache<V> {
    pub fn new() -> Self {
        Self::with_options(true, None)
    }

    /// `enabled = false` turns every lookup into a pass-through to the producer.
    pub fn with_options(enabled: bool, ttl: Option<Duration>) -> Self {
        Self {
            enabled,
            ttl,
            entries: DashMap::new(),
            tag_index: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidated: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, or run `producer` once, store its
    /// output under `tag` and return it. Producer errors are returned as-is
    /// and nothing is stored.
    pub async fn get_or_insert_with<F, Fut, E>(
        &self,
        key: &str,
        tag: &str,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!(cache_key = key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(cache_key = key, tag, "cache miss");
        let value = producer().await?;
        self.insert(key, value.clone(), &[tag]);
        Ok(value)
    }

    /// Look up a live entry.
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let now = Instant::now();
        let found = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match found {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.evict_if_expired(key, now);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry and its tags.
    pub fn insert(&self, key: &str, value: V, tags: &[&str]) {
        if !self.enabled {
            return;
        }

        let entry = Entry {
            value,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };

        if let Some(previous) = self.entries.insert(key.to_string(), entry) {
            self.unlink(key, &previous.tags);
        }

        for tag in tags {
            self.tag_index
                .entry(tag.to_string())
                .or_default()
                .insert(key.to_string());
        }
    }

    /// Remove a single entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                self.unlink(key, &entry.tags);
                true
            }
            None => false,
        }
    }

    /// Remove `key` only if the entry stored now is expired at `now`; a
    /// value inserted since the caller's lookup stays.
    fn evict_if_expired(&self, key: &str, now: Instant) -> bool {
        match self.entries.remove_if(key, |_, entry| entry.is_expired(now)) {
            Some((_, expired)) => {
                self.unlink(key, &expired.tags);
                true
            }
            None => false,
        }
    }

    /// Drop every entry carrying `tag`. Returns the number of entries removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let keys = match self.tag_index.remove(tag) {
            Some((_, keys)) => keys,
            None => {
                tracing::debug!(tag, removed = 0, "cache tag invalidated");
                return 0;
            }
        };

        let mut removed = 0;
        for key in &keys {
            if let Some((_, entry)) = self.entries.remove(key) {
                let other_tags: Vec<String> =
                    entry.tags.into_iter().filter(|t| t != tag).collect();
                self.unlink(key, &other_tags);
                removed += 1;
            }
        }

        self.invalidated.fetch_add(removed as u64, Ordering::Relaxed);
        tracing::debug!(tag, removed, "cache tag invalidated");
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    fn unlink(&self, key: &str, tags: &[String]) {
        for tag in tags {
            let now_empty = match self.tag_index.get_mut(tag) {
                Some(mut keys) => {
                    keys.remove(key);
                    keys.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.tag_index.remove_if(tag, |_, keys| keys.is_empty());
            }
        }
    }
}

impl<V: Clone> Default for TagCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    async fn fill(cache: &TagCache<String>, key: &str, tag: &str, calls: &AtomicUsize) -> String {
        cache
            .get_or_insert_with(key, tag, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(format!("value-for-{key}"))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn producer_runs_once_until_invalidated() {
        let cache = TagCache::new();
        let calls = AtomicUsize::new(0);

        let first = fill(&cache, "list:books:1:3", "booksCache", &calls).await;
        let second = fill(&cache, "list:books:1:3", "booksCache", &calls).await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.invalidate_tag("booksCache"), 1);
        fill(&cache, "list:books:1:3", "booksCache", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_the_tag() {
        let cache = TagCache::new();
        cache.insert("a", "1".to_string(), &["booksCache"]);
        cache.insert("b", "2".to_string(), &["booksCache"]);
        cache.insert("c", "3".to_string(), &["other"]);

        assert_eq!(cache.invalidate_tag("booksCache"), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some("3".to_string()));
        assert_eq!(cache.invalidate_tag("booksCache"), 0);
    }

    #[tokio::test]
    async fn producer_error_is_not_cached() {
        let cache: TagCache<String> = TagCache::new();
        let result = cache
            .get_or_insert_with("k", "t", || async { Err::<String, _>("backend down") })
            .await;
        assert_eq!(result, Err("backend down"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn disabled_cache_always_calls_producer() {
        let cache = TagCache::with_options(false, None);
        let calls = AtomicUsize::new(0);
        fill(&cache, "k", "t", &calls).await;
        fill(&cache, "k", "t", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn expired_entries_are_refilled() {
        let cache = TagCache::with_options(true, Some(Duration::from_millis(10)));
        let calls = AtomicUsize::new(0);
        fill(&cache, "k", "t", &calls).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        fill(&cache, "k", "t", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn eviction_spares_an_entry_refreshed_after_expiry() {
        let cache = TagCache::with_options(true, Some(Duration::from_secs(60)));
        cache.insert("k", 1u32, &["t"]);

        assert!(!cache.evict_if_expired("k", Instant::now()));
        assert_eq!(cache.get("k"), Some(1));

        assert!(cache.evict_if_expired("k", Instant::now() + Duration::from_secs(120)));
        assert!(cache.is_empty());
        assert_eq!(cache.invalidate_tag("t"), 0);
    }

    #[test]
    fn reinsert_moves_entry_to_new_tags() {
        let cache = TagCache::new();
        cache.insert("k", 1u32, &["old"]);
        cache.insert("k", 2u32, &["new"]);
        assert_eq!(cache.invalidate_tag("old"), 0);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.invalidate_tag("new"), 1);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = TagCache::new();
        cache.insert("k", 1u32, &["t"]);
        let _ = cache.get("k");
        let _ = cache.get("missing");
        cache.invalidate_tag("t");
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                invalidated: 1,
                entries: 0,
            }
        );
    }

    #[tokio::test]
    async fn concurrent_fills_and_invalidations_do_not_panic() {
        let cache = Arc::new(TagCache::new());
        let mut handles = Vec::new();
        for i in 0..16u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("list:books:{}:3", i % 4);
                for _ in 0..50 {
                    let _ = cache
                        .get_or_insert_with(&key, "booksCache", || async {
                            Ok::<_, Infallible>(i)
                        })
                        .await;
                    if i % 5 == 0 {
                        cache.invalidate_tag("booksCache");
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(cache.len() <= 4);
    }
}
