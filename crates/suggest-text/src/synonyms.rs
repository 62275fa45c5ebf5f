//! One-to-many synonym/ontology expansion over the snapshot's rules.

use std::collections::HashMap;

use suggest_core::types::SynonymRule;

use crate::tokenize::tokenize;

/// Expanded form of a query: the original text with matched alternate
/// terms appended, and the deduplicated token set used for matching.
#[derive(Debug, Clone)]
pub struct ExpandedQuery {
    pub text: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SynonymTable {
    by_base: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn from_rules(rules: &[SynonymRule]) -> Self {
        let mut by_base: HashMap<String, Vec<String>> = HashMap::new();
        for rule in rules {
            let base = rule.base.trim().to_lowercase();
            if base.is_empty() {
                continue;
            }
            let terms = by_base.entry(base).or_default();
            for term in &rule.terms {
                let term = term.trim().to_lowercase();
                if !term.is_empty() && !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }
        Self { by_base }
    }

    pub fn is_empty(&self) -> bool {
        self.by_base.is_empty()
    }

    /// Expand a normalized query. Every base term contained in the query
    /// contributes its alternates to both the scoring text and the token
    /// set; tokens stay deduplicated in first-seen order.
    pub fn expand(&self, normalized_query: &str) -> ExpandedQuery {
        let mut text = normalized_query.to_string();
        let mut tokens = tokenize(normalized_query);

        let mut bases: Vec<&String> = self.by_base.keys().collect();
        bases.sort();
        for base in bases {
            if !normalized_query.contains(base.as_str()) {
                continue;
            }
            for term in &self.by_base[base] {
                text.push(' ');
                text.push_str(term);
                for token in tokenize(term) {
                    if !tokens.contains(&token) {
                        tokens.push(token);
                    }
                }
            }
        }
        ExpandedQuery { text, tokens }
    }
}
