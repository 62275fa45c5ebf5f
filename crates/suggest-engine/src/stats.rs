//! Process-local counters surfaced to the analytics collaborator and used
//! by the cold-start popularity ordering.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct EngineStats {
    computations: AtomicU64,
    cache_hits: AtomicU64,
    embedding_failures: AtomicU64,
    feedback_events: AtomicU64,
    popularity: DashMap<String, u64>,
}

impl EngineStats {
    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_embedding_failure(&self) {
        self.embedding_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feedback(&self) {
        self.feedback_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump the popularity of a normalized query or suggestion text.
    pub fn record_popularity(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        *self.popularity.entry(text.to_string()).or_insert(0) += 1;
    }

    pub fn popularity_of(&self, text: &str) -> u64 {
        self.popularity.get(text).map(|e| *e).unwrap_or(0)
    }

    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn embedding_failures(&self) -> u64 {
        self.embedding_failures.load(Ordering::Relaxed)
    }

    pub fn feedback_events(&self) -> u64 {
        self.feedback_events.load(Ordering::Relaxed)
    }
}
