//! Bounded LRU memo cache for candidate embeddings.
//!
//! Keyed by candidate text; consulted before calling the embedder and
//! written through on miss, so repeated candidate texts across requests pay
//! embedding cost once. The embedding call itself happens outside the lock.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use suggest_core::traits::Embedder;

pub struct EmbeddingCache {
    inner: Mutex<LruCache<String, Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached vector for `text`, computing and inserting it on a
    /// miss. Two concurrent misses for the same text may both embed; the
    /// later write wins, which is harmless for a deterministic embedder.
    pub fn get_or_embed(
        &self,
        embedder: &dyn Embedder,
        text: &str,
    ) -> anyhow::Result<Arc<Vec<f32>>> {
        if let Some(hit) = self.lock().get(text) {
            return Ok(Arc::clone(hit));
        }
        let vector = Arc::new(embedder.embed(text)?);
        self.lock().put(text.to_string(), Arc::clone(&vector));
        Ok(vector)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<Vec<f32>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
