//! In-process response cache with per-entry TTL and LRU eviction.
//!
//! Entries expire after the TTL given to [`MemoryCache::set`] and are evicted
//! least-recently-used when the store reaches capacity. Nothing is persisted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

/// A single cached value.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    /// `None` when the TTL overflows the clock; such entries never expire.
    expires_at: Option<Instant>,
    /// Logical clock value of the last read or write.
    last_access: u64,
    hit_count: u32,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
}

impl CacheStore {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Thread-safe in-memory cache.
#[derive(Debug)]
pub struct MemoryCache {
    store: Mutex<CacheStore>,
    max_entries: usize,
}

impl MemoryCache {
    /// `max_entries` is clamped to a minimum of 1.
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Mutex::new(CacheStore::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached value, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut store = self.lock();
        let now = Instant::now();
        let expired = store.entries.get(key).map(|e| e.is_expired(now));
        match expired {
            Some(true) => {
                debug!(key = %short(key), "Cache entry expired, removing");
                store.entries.remove(key);
                None
            }
            Some(false) => {
                let tick = store.tick();
                let entry = store.entries.get_mut(key)?;
                entry.last_access = tick;
                entry.hit_count = entry.hit_count.saturating_add(1);
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    /// Store a value. Evicts expired entries first, then LRU entries if at capacity.
    pub fn set(&self, key: String, value: String, ttl: Duration) {
        let mut store = self.lock();
        let now = Instant::now();
        store.entries.retain(|_, e| !e.is_expired(now));
        if !store.entries.contains_key(&key) {
            while store.entries.len() >= self.max_entries {
                if !evict_lru(&mut store) {
                    break;
                }
            }
        }
        let tick = store.tick();
        store.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now.checked_add(ttl),
                last_access: tick,
                hit_count: 0,
            },
        );
    }

    /// Drop one entry.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Aggregate statistics.
    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        CacheStats {
            total_entries: store.entries.len(),
            total_hits: store
                .entries
                .values()
                .map(|e| u64::from(e.hit_count))
                .sum(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        // A panic while holding the lock cannot leave the map inconsistent.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn evict_lru(store: &mut CacheStore) -> bool {
    let lru_key = store
        .entries
        .iter()
        .min_by_key(|(_, e)| e.last_access)
        .map(|(k, _)| k.clone());
    match lru_key {
        Some(key) => {
            debug!(key = %short(&key), "Evicting LRU cache entry");
            store.entries.remove(&key);
            true
        }
        None => false,
    }
}

fn short(key: &str) -> &str {
    let start = key.find(':').map(|i| i + 1).unwrap_or(0);
    let end = (start + 8).min(key.len());
    key.get(start..end).unwrap_or(key)
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Cumulative hits across live entries.
    pub total_hits: u64,
}
