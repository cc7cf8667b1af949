//! In-process memoization for rerank results
//!
//! Entries are keyed by `(sorted article_ids, top_k)` and expire after a
//! fixed TTL. The TTL should not exceed the seed bucket width, otherwise a
//! cached draw outlives the bucket it was sampled in.
//!
//! The pipeline is correct with or without this layer; it only saves
//! recomputation for repeated identical requests.

use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{ScoredCandidate, SessionQuery};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

type CacheKey = (Vec<i64>, usize);

#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at: Instant,
    results: Vec<ScoredCandidate>,
}

/// TTL cache wrapping `RerankPipeline` calls
pub struct RecommendationCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl RecommendationCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries.max(1),
        }
    }

    fn key(query: &SessionQuery) -> CacheKey {
        (query.article_ids().to_vec(), query.top_k())
    }

    /// Cached results for `query`, or run `compute` and store its output.
    /// Errors are returned as-is and never cached.
    pub fn get_or_compute<F>(&self, query: &SessionQuery, compute: F) -> Result<Vec<ScoredCandidate>>
    where
        F: FnOnce() -> Result<Vec<ScoredCandidate>>,
    {
        let key = Self::key(query);

        if let Some(results) = self.get_fresh(&key) {
            debug!(top_k = query.top_k(), "Recommendation cache hit");
            return Ok(results);
        }

        let results = compute()?;
        self.insert(key, results.clone());
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn get_fresh(&self, key: &CacheKey) -> Option<Vec<ScoredCandidate>> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.results.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn insert(&self, key: CacheKey, results: Vec<ScoredCandidate>) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict();
        }

        self.entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                results,
            },
        );
    }

    /// Drop expired entries, then the oldest one if still at capacity
    fn evict(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        if self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().inserted_at)
                .map(|entry| entry.key().clone());

            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }
    }
}
