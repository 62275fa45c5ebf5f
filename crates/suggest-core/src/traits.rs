/// Black-box text embedding capability. Implementations must be cheap to
/// share across requests; latency and failure are handled by the caller.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Term-overlap relevance capability. Scores are non-negative, unbounded
/// above and comparable only within one call.
pub trait LexicalScorer: Send + Sync {
    fn score(&self, query_tokens: &[String], candidate_tokens: &[Vec<String>]) -> Vec<f64>;
}
