//! Resolution cache
//!
//! Memoizes whole-text resolutions keyed by code points and base direction.
//! Entries are shared as `Arc<DisplayOrderResult>` so a hit never copies the
//! per-character data.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::resolver::DisplayOrderResult;
use crate::types::Direction;

static KEY_HASHER: Lazy<ahash::RandomState> = Lazy::new(ahash::RandomState::new);

/// Cache key with a precomputed hash of the text
#[derive(Debug, Clone)]
pub struct ResolutionKey {
    text: Arc<[u32]>,
    direction: Direction,
    hash: u64,
}

impl ResolutionKey {
    pub fn new(text: &[u32], direction: Direction) -> Self {
        let hash = KEY_HASHER.hash_one((text, direction));
        Self {
            text: Arc::from(text),
            direction,
            hash,
        }
    }
}

impl Hash for ResolutionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for ResolutionKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.direction == other.direction && self.text == other.text
    }
}

impl Eq for ResolutionKey {}

/// Hit/miss counters and current size of a [`ResolutionCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU cache of resolved texts
pub struct ResolutionCache {
    entries: Mutex<LruCache<ResolutionKey, Arc<DisplayOrderResult>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &ResolutionKey) -> Option<Arc<DisplayOrderResult>> {
        let found = self.entries.lock().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, key: ResolutionKey, result: Arc<DisplayOrderResult>) {
        self.entries.lock().put(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;

    fn key(s: &str, direction: Direction) -> ResolutionKey {
        let text: Vec<u32> = s.chars().map(|c| c as u32).collect();
        ResolutionKey::new(&text, direction)
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn keys_distinguish_direction() {
        assert_eq!(key("abc", Direction::Auto), key("abc", Direction::Auto));
        assert_ne!(key("abc", Direction::Auto), key("abc", Direction::RightToLeft));
        assert_ne!(key("abc", Direction::Auto), key("abd", Direction::Auto));
    }

    #[test]
    fn counts_hits_and_misses() {
        let cache = ResolutionCache::new(capacity(4));
        let k = key("abc", Direction::Auto);
        assert!(cache.get(&k).is_none());

        let text: Vec<u32> = "abc".chars().map(|c| c as u32).collect();
        cache.insert(k.clone(), Arc::new(resolve(&text, Direction::Auto)));
        assert!(cache.get(&k).is_some());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResolutionCache::new(capacity(1));
        let text: Vec<u32> = "x".chars().map(|c| c as u32).collect();
        let result = Arc::new(resolve(&text, Direction::Auto));

        cache.insert(key("a", Direction::Auto), Arc::clone(&result));
        cache.insert(key("b", Direction::Auto), result);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("a", Direction::Auto)).is_none());
        assert!(cache.get(&key("b", Direction::Auto)).is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
