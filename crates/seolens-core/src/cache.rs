//! Time- and capacity-bounded result cache
//!
//! Entries expire `ttl` after insertion. Expired entries are purged before a
//! write, and only then is the least-recently-used live entry evicted if the
//! store is full. A single mutex guards every operation.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::types::AnalysisResult;
use crate::url_utils::normalize_cache_key;

pub const DEFAULT_TTL: Duration = Duration::from_secs(900);
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Maximum number of live entries (at least 1)
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

struct CacheEntry {
    value: Arc<AnalysisResult>,
    inserted_at: Instant,
}

pub struct ResultCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up `address`, dropping the entry if it has expired.
    pub fn get(&self, address: &str) -> Option<Arc<AnalysisResult>> {
        let key = normalize_cache_key(address);
        let mut entries = self.entries.lock();

        let found = entries
            .get(&key)
            .map(|entry| (entry.inserted_at.elapsed() < self.ttl, Arc::clone(&entry.value)));

        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.pop(&key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `address`, replacing any previous entry.
    pub fn put(&self, address: &str, value: Arc<AnalysisResult>) {
        let key = normalize_cache_key(address);
        let mut entries = self.entries.lock();
        purge(&mut entries, self.ttl);

        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        if let Some((evicted, _)) = entries.push(key.clone(), entry)
            && evicted != key
        {
            trace!(key = %evicted, "result cache full, evicted least recently used entry");
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        purge(&mut entries, self.ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

fn purge(entries: &mut LruCache<String, CacheEntry>, ttl: Duration) -> usize {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| entry.inserted_at.elapsed() >= ttl)
        .map(|(key, _)| key.clone())
        .collect();

    for key in &expired {
        entries.pop(key);
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtractedFields;

    fn result(title: &str) -> Arc<AnalysisResult> {
        let fields = ExtractedFields {
            title: title.to_string(),
            ..Default::default()
        };
        Arc::new(AnalysisResult::new(fields, 200, None))
    }

    fn cache(ttl: Duration, capacity: usize) -> ResultCache {
        ResultCache::new(CacheConfig { ttl, capacity })
    }

    #[test]
    fn stores_and_returns_results() {
        let cache = ResultCache::default();
        assert!(cache.get("https://example.com").is_none());

        cache.put("https://example.com", result("Home"));
        let hit = cache.get("https://example.com").unwrap();
        assert_eq!(hit.title, "Home");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn trailing_slash_is_the_same_key() {
        let cache = ResultCache::default();
        cache.put("https://example.com/", result("Home"));
        assert!(cache.get("https://example.com").is_some());
        assert!(cache.get("https://example.com/").is_some());
        assert!(cache.get("https://example.com//").is_none());
    }

    #[test]
    fn expired_entries_are_not_served() {
        let cache = cache(Duration::ZERO, 10);
        cache.put("https://example.com", result("Home"));
        assert!(cache.get("https://example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = cache(DEFAULT_TTL, 2);
        cache.put("https://a.example", result("A"));
        cache.put("https://b.example", result("B"));

        // touch A so that B becomes the eviction candidate
        assert!(cache.get("https://a.example").is_some());
        cache.put("https://c.example", result("C"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("https://a.example").is_some());
        assert!(cache.get("https://b.example").is_none());
        assert!(cache.get("https://c.example").is_some());
    }

    #[test]
    fn expiry_runs_before_capacity_eviction() {
        let cache = cache(Duration::ZERO, 2);
        cache.put("https://a.example", result("A"));
        cache.put("https://b.example", result("B"));
        cache.put("https://c.example", result("C"));
        // every earlier write had already expired and was purged first
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_replaces_value() {
        let cache = ResultCache::default();
        cache.put("https://example.com", result("Old"));
        cache.put("https://example.com/", result("New"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("https://example.com").unwrap().title, "New");
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let cache = cache(DEFAULT_TTL, 0);
        cache.put("https://a.example", result("A"));
        cache.put("https://b.example", result("B"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("https://b.example").is_some());
    }

    #[test]
    fn concurrent_access() {
        let cache = Arc::new(cache(DEFAULT_TTL, 64));
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..50 {
                        let key = format!("https://example.com/{worker}/{i}");
                        cache.put(&key, result("Page"));
                        let _ = cache.get(&key);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 64);
    }
}
