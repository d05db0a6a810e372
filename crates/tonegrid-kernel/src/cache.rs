//! Bounded, time-expiring response cache.
//!
//! Keyed by [`CacheKey`]. Entries leave the cache by whichever comes first:
//! - capacity: inserting into a full cache evicts the least-recently-used entry
//! - age: an entry older than the TTL reads as absent and is dropped on access
//!
//! A successful `get` refreshes recency (eviction order) but never the
//! expiry clock, which always counts from insertion.
//!
//! # Lifecycle
//!
//! Created once per process and shared behind an `Arc`. It is only emptied
//! through [`ResponseCache::clear`]. Tests build a fresh instance each.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::cache_key::CacheKey;
use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};

/// A cached transformation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The transformed text.
    pub transformed: String,
    /// When the entry was written. Expiry counts from here.
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries physically stored (may include not-yet-dropped expired ones).
    pub size: usize,
    pub capacity: usize,
    pub ttl: Duration,
}

/// Thread-safe LRU cache with a fixed per-entry TTL.
pub struct ResponseCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ResponseCache")
            .field("size", &stats.size)
            .field("capacity", &stats.capacity)
            .field("ttl", &stats.ttl)
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Look up a live entry, refreshing its recency.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) evaluated at an explicit instant.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<CacheEntry> {
        let mut entries = self.entries.lock();

        let expired = entries.peek(key)?.is_expired(now, self.ttl);
        if expired {
            entries.pop(key);
            tracing::debug!(key = %key.short(), "cache entry expired");
            return None;
        }

        entries.get(key).cloned()
    }

    /// Insert or overwrite an entry, evicting the LRU entry when full.
    pub fn put(&self, key: CacheKey, transformed: impl Into<String>) {
        self.put_at(key, transformed, Instant::now());
    }

    /// [`put`](Self::put) stamped with an explicit instant.
    pub fn put_at(&self, key: CacheKey, transformed: impl Into<String>, now: Instant) {
        let entry = CacheEntry {
            transformed: transformed.into(),
            created_at: now,
        };
        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key, entry) {
            if evicted != key {
                tracing::debug!(key = %evicted.short(), "cache evicted least-recently-used entry");
            }
        }
    }

    /// Drop every entry whose TTL has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// [`purge_expired`](Self::purge_expired) evaluated at an explicit instant.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, e)| e.is_expired(now, self.ttl))
            .map(|(k, _)| *k)
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            size: entries.len(),
            capacity: entries.cap().get(),
            ttl: self.ttl,
        }
    }
}
