//! Short-lived in-memory cache of fetched collections.
//!
//! A collection is reused for the freshness window (five minutes by
//! default) and treated as absent afterwards. Nothing is persisted.

use shared::config::CacheConfig;
use shared::CollectionSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedCollection {
    fetched_at: Instant,
    collection: Arc<CollectionSet>,
}

/// Freshness cache keyed by user id
pub struct FreshnessCache {
    entries: HashMap<String, CachedCollection>,
    /// How long an entry stays fresh
    ttl: Duration,
    /// Whether caching is enabled
    enabled: bool,
}

impl FreshnessCache {
    /// Create a new cache
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            enabled,
        }
    }

    /// Create a cache from the `[cache]` configuration section
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.freshness_seconds), config.enabled)
    }

    /// A cache that never holds anything
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    /// Get the cached collection for a user if it is still fresh
    pub fn get(&self, user_id: &str) -> Option<Arc<CollectionSet>> {
        if !self.enabled {
            return None;
        }

        match self.entries.get(user_id) {
            Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                debug!(user_id = user_id, "Cache hit");
                Some(Arc::clone(&cached.collection))
            }
            Some(_) => {
                debug!(user_id = user_id, "Cache entry stale");
                None
            }
            None => {
                debug!(user_id = user_id, "Cache miss");
                None
            }
        }
    }

    /// Store a freshly fetched collection, dropping stale entries first
    pub fn set(&mut self, user_id: &str, collection: Arc<CollectionSet>) {
        if !self.enabled {
            return;
        }

        let evicted = self.evict_stale();
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted stale cache entries");
        }

        self.entries.insert(
            user_id.to_string(),
            CachedCollection {
                fetched_at: Instant::now(),
                collection,
            },
        );
        debug!(user_id = user_id, "Cache stored");
    }

    /// Check if a fresh entry exists
    pub fn is_fresh(&self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }

    /// Drop the entry for one user
    pub fn invalidate(&mut self, user_id: &str) {
        self.entries.remove(user_id);
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop stale entries, returning how many were removed
    pub fn evict_stale(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            fresh_entries: self
                .entries
                .values()
                .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
                .count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
}
