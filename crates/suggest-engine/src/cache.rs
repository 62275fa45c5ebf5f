//! TTL cache for full ranked responses.
//!
//! Keyed by a fingerprint of everything that determines a cacheable
//! result: normalized query, user id, rounded user coordinate and the
//! snapshot version marker. Two requests with the same fingerprint inside
//! the TTL window receive the identical payload.

use dashmap::DashMap;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use twox_hash::XxHash64;

use suggest_core::types::{Coordinate, RankResponse};

pub fn fingerprint(
    normalized_query: &str,
    user_id: Option<&str>,
    coordinate: Option<Coordinate>,
    coord_precision: u32,
    snapshot_version: u64,
) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(normalized_query.as_bytes());
    hasher.write(b"\0");
    hasher.write(user_id.unwrap_or("").as_bytes());
    hasher.write(b"\0");
    if let Some(coord) = coordinate {
        let precision = usize::try_from(coord_precision).unwrap_or(3);
        hasher.write(format!("{:.precision$},{:.precision$}", coord.lat, coord.lon).as_bytes());
    }
    hasher.write(b"\0");
    hasher.write(&snapshot_version.to_le_bytes());
    hasher.finish()
}

struct CachedEntry {
    created: Instant,
    payload: Arc<RankResponse>,
}

pub struct SuggestionCache {
    entries: DashMap<u64, CachedEntry>,
    ttl: Duration,
}

impl SuggestionCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Fresh hit or nothing; expired entries are dropped on access.
    pub fn get(&self, key: u64) -> Option<Arc<RankResponse>> {
        let hit = {
            let entry = self.entries.get(&key)?;
            if entry.created.elapsed() < self.ttl {
                Some(Arc::clone(&entry.payload))
            } else {
                None
            }
        };
        if hit.is_none() {
            self.entries.remove(&key);
        }
        hit
    }

    /// Atomic check-then-set per key: the first writer inside a TTL window
    /// wins, so a concurrent recompute for the same key never replaces a
    /// fresh entry with a different payload.
    pub fn insert(&self, key: u64, payload: Arc<RankResponse>) {
        self.entries
            .entry(key)
            .and_modify(|existing| {
                if existing.created.elapsed() >= self.ttl {
                    *existing = CachedEntry {
                        created: Instant::now(),
                        payload: Arc::clone(&payload),
                    };
                }
            })
            .or_insert_with(|| CachedEntry {
                created: Instant::now(),
                payload,
            });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
