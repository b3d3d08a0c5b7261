//! Per-category memo of aggregated movie lists.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::models::MovieRecord;

pub type CachedMovies = Arc<Vec<MovieRecord>>;

/// Cache key for a sport category.
pub fn cache_key(sport: &str) -> String {
    sport.to_lowercase()
}

/// Key-value store for aggregated results, keyed by [`cache_key`].
pub trait CategoryCache: Send + Sync {
    /// Returns the stored value itself, not a copy of its contents.
    fn get(&self, key: &str) -> Option<CachedMovies>;

    /// Stores `movies`, replacing any previous entry for `key`.
    fn put(&self, key: &str, movies: CachedMovies);

    fn stats(&self) -> CacheStats;

    fn clear(&self);

    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub keys: Vec<String>,
    pub oldest_entry: Option<DateTime<Utc>>,
}

struct CacheEntry {
    movies: CachedMovies,
    stored_at: DateTime<Utc>,
}

/// Unbounded in-process cache. Entries live until overwritten or cleared.
#[derive(Default)]
pub struct InMemoryCategoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCategoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryCache for InMemoryCategoryCache {
    fn get(&self, key: &str) -> Option<CachedMovies> {
        let found = self.entries.read().get(key).map(|e| e.movies.clone());
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn put(&self, key: &str, movies: CachedMovies) {
        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                movies,
                stored_at: Utc::now(),
            },
        );
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        CacheStats {
            entries: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys,
            oldest_entry: entries.values().map(|e| e.stored_at).min(),
        }
    }

    fn clear(&self) {
        self.entries.write().clear();
        log::info!("Category cache cleared");
    }
}

/// Never stores anything; every lookup misses.
#[derive(Default)]
pub struct DisabledCategoryCache {
    misses: AtomicU64,
}

impl CategoryCache for DisabledCategoryCache {
    fn get(&self, _key: &str) -> Option<CachedMovies> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, _key: &str, _movies: CachedMovies) {}

    fn stats(&self) -> CacheStats {
        CacheStats {
            misses: self.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        }
    }

    fn clear(&self) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
