//! BM25 term-overlap scorer computed per ranking pass.
//!
//! Document-frequency statistics come from the current candidate set, not
//! a persistent index, so scores are comparable only within one pass.

use std::collections::{HashMap, HashSet};

use suggest_core::traits::LexicalScorer;

#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25 {
    /// Score every candidate document against the query tokens. A document
    /// with zero token overlap scores exactly 0.0.
    pub fn score_all(&self, query_tokens: &[String], docs: &[Vec<String>]) -> Vec<f64> {
        if docs.is_empty() || query_tokens.is_empty() {
            return vec![0.0; docs.len()];
        }

        let n = docs.len() as f64;
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut total_len = 0usize;
        for doc in docs {
            total_len += doc.len();
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        let avgdl = (total_len as f64 / n).max(1.0);

        docs.iter()
            .map(|doc| {
                if doc.is_empty() {
                    return 0.0;
                }
                let dl = doc.len() as f64;
                let mut tf: HashMap<&str, f64> = HashMap::new();
                for term in doc {
                    *tf.entry(term.as_str()).or_insert(0.0) += 1.0;
                }
                query_tokens
                    .iter()
                    .filter_map(|q| {
                        let freq = *tf.get(q.as_str())?;
                        let df_q = *df.get(q.as_str())? as f64;
                        // Non-negative idf variant: ln(1 + (N - df + 0.5)/(df + 0.5))
                        let idf = (1.0 + (n - df_q + 0.5) / (df_q + 0.5)).ln();
                        let norm = freq * (self.k1 + 1.0)
                            / (freq + self.k1 * (1.0 - self.b + self.b * dl / avgdl));
                        Some(idf * norm)
                    })
                    .sum()
            })
            .collect()
    }
}

impl LexicalScorer for Bm25 {
    fn score(&self, query_tokens: &[String], candidate_tokens: &[Vec<String>]) -> Vec<f64> {
        self.score_all(query_tokens, candidate_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn docs(texts: &[&str]) -> Vec<Vec<String>> {
        texts.iter().map(|t| tokenize(t)).collect()
    }

    #[test]
    fn overlapping_doc_outscores_disjoint_doc() {
        let corpus = docs(&["family doctor clinic", "tax attorney office"]);
        let scores = Bm25::default().score_all(&tokenize("doctor"), &corpus);
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0, "zero overlap scores exactly zero");
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let corpus = docs(&[
            "plumber service",
            "plumber emergency",
            "plumber repair",
            "roofer service",
        ]);
        let scores = Bm25::default().score_all(&tokenize("roofer plumber"), &corpus);
        // "roofer" appears in one document, "plumber" in three.
        assert!(
            scores[3] > scores[0],
            "document matching the rare term should win: {scores:?}"
        );
    }

    #[test]
    fn empty_inputs_score_zero() {
        let scorer = Bm25::default();
        assert!(scorer.score_all(&tokenize("anything"), &[]).is_empty());
        let corpus = docs(&["some text"]);
        assert_eq!(scorer.score_all(&[], &corpus), vec![0.0]);
    }
}
