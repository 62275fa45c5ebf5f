//! Embedding implementations and vector similarity helpers.

pub mod cache;

pub use cache::EmbeddingCache;

use std::hash::{Hash, Hasher};
use suggest_core::traits::Embedder;
use twox_hash::XxHash64;

/// Deterministic hashed bag-of-words embedder.
///
/// Each whitespace token is bucketed by XxHash64 and contributes a
/// hash-derived magnitude; the result is L2-normalized. No model files, no
/// I/O, identical output for identical input — the offline default and the
/// deterministic test double.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + 0.1;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Cosine similarity in [-1, 1]. Zero vectors yield 0.0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        return 0.0;
    }
    dot / (na * nb)
}

/// Clip a similarity into [0, 1] before fusion.
pub fn clip_unit(score: f32) -> f64 {
    f64::from(score.clamp(0.0, 1.0))
}
