//! Bounded Lookup Memo

use crate::LookupResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Default number of domains kept in the memo
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Normalize a domain into a cache key.
///
/// Lowercases, trims, strips any `scheme://` prefix, path, port and trailing dot.
pub fn normalize_domain(domain: &str) -> String {
    let mut key = domain.trim().to_lowercase();
    if let Some(idx) = key.find("://") {
        key = key[idx + 3..].to_string();
    }
    if let Some(idx) = key.find(['/', '?', '#']) {
        key.truncate(idx);
    }
    if let Some(idx) = key.rfind(':') {
        if key[idx + 1..].chars().all(|c| c.is_ascii_digit()) {
            key.truncate(idx);
        }
    }
    key.trim_end_matches('.').to_string()
}

/// Thread-safe LRU memo of lookup results keyed by normalized domain
pub struct LookupCache {
    /// LRU storage; the lock is never held across an await point
    entries: Mutex<LruCache<String, LookupResult>>,
    /// Configured capacity
    capacity: usize,
    /// Cache hits (for statistics)
    hits: AtomicU64,
    /// Cache misses (for statistics)
    misses: AtomicU64,
}

impl LookupCache {
    /// Create a cache holding at most `capacity` domains (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let bound = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(bound)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fetch a memoized result, refreshing its recency
    pub fn get(&self, domain: &str) -> Option<LookupResult> {
        let key = normalize_domain(domain);
        let found = self
            .entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.get(&key).copied());

        match found {
            Some(result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Lookup cache hit for {}", key);
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a result, evicting the least recently used entry when full
    pub fn insert(&self, domain: &str, result: LookupResult) {
        let key = normalize_domain(domain);
        if let Ok(mut entries) = self.entries.lock() {
            if let Some((evicted, _)) = entries.push(key.clone(), result) {
                if evicted != key {
                    debug!("Lookup cache evicted {}", evicted);
                }
            }
        }
    }

    /// Number of memoized domains
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
