use std::sync::atomic::{AtomicUsize, Ordering};

use suggest_core::traits::Embedder;
use suggest_embed::{clip_unit, cosine, EmbeddingCache, HashEmbedder};

#[test]
fn hash_embedder_is_deterministic_and_normalized() {
    let embedder = HashEmbedder::new(64);
    let a = embedder.embed("family doctor").expect("embed");
    let b = embedder.embed("family doctor").expect("embed");
    assert_eq!(a, b);

    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4, "unit length, got {norm}");
}

#[test]
fn similar_texts_score_higher_than_unrelated() {
    let embedder = HashEmbedder::new(256);
    let doctor = embedder.embed("family doctor clinic").expect("embed");
    let doctor2 = embedder.embed("family doctor").expect("embed");
    let roofer = embedder.embed("metal roofing contractor").expect("embed");

    assert!(cosine(&doctor, &doctor2) > cosine(&doctor, &roofer));
}

#[test]
fn clip_unit_bounds_cosine_output() {
    assert_eq!(clip_unit(-0.4), 0.0);
    assert_eq!(clip_unit(0.5), 0.5);
    assert_eq!(clip_unit(1.7), 1.0);
}

struct CountingEmbedder {
    calls: AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn dim(&self) -> usize {
        8
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HashEmbedder::new(8).embed(text)
    }
}

#[test]
fn cache_memoizes_repeated_texts() {
    let embedder = CountingEmbedder {
        calls: AtomicUsize::new(0),
    };
    let cache = EmbeddingCache::new(16);

    let first = cache.get_or_embed(&embedder, "plumber").expect("embed");
    let second = cache.get_or_embed(&embedder, "plumber").expect("embed");

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1, "one real call");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn cache_evicts_least_recently_used() {
    let embedder = CountingEmbedder {
        calls: AtomicUsize::new(0),
    };
    let cache = EmbeddingCache::new(2);

    cache.get_or_embed(&embedder, "one").expect("embed");
    cache.get_or_embed(&embedder, "two").expect("embed");
    cache.get_or_embed(&embedder, "three").expect("embed"); // evicts "one"
    assert_eq!(cache.len(), 2);

    cache.get_or_embed(&embedder, "one").expect("embed");
    assert_eq!(
        embedder.calls.load(Ordering::SeqCst),
        4,
        "evicted entry embeds again"
    );
}
