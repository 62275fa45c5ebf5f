//! Personalization & learning state.
//!
//! [`PreferenceStore`] owns all mutable learning state: per-user learned
//! term/suggestion weights and the negative-feedback set. It is mutated
//! only through [`PreferenceStore::record_feedback`]; every other access is
//! read-only. DashMap shard locks serialize writes per user key, and a read
//! racing a write sees either the pre- or post-update profile, never a torn
//! one. Weights grow monotonically: no decay, no eviction.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use suggest_core::config::FeedbackConfig;
use suggest_core::error::{Error, Result};
use suggest_text::{normalize, tokenize};

pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

/// Learned state for one user. Append/increment only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Learned weight per term or full suggestion text.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    /// Suggestion texts explicitly rated unsuccessful; suppresses
    /// re-surfacing.
    #[serde(default)]
    pub negatives: HashSet<String>,
    /// Times a location string accompanied this user's feedback. Read by
    /// the external analytics collaborator, not by ranking.
    #[serde(default)]
    pub location_counts: HashMap<String, u64>,
    #[serde(default)]
    pub feedback_count: u64,
}

pub struct PreferenceStore {
    profiles: DashMap<String, UserProfile>,
    feedback: FeedbackConfig,
}

impl PreferenceStore {
    pub fn new(feedback: FeedbackConfig) -> Self {
        Self {
            profiles: DashMap::new(),
            feedback,
        }
    }

    /// Ingest one feedback event. High ratings reinforce the terms shared
    /// by the query and the selected suggestion (plus the full suggestion
    /// text); low ratings add the suggestion to the user's negative set.
    /// Unknown user ids implicitly create a profile.
    pub fn record_feedback(
        &self,
        user_id: &str,
        query: &str,
        suggestion: &str,
        rating: u8,
        location: Option<&str>,
    ) -> Result<()> {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(Error::InvalidFeedback(format!(
                "success_rating must be in {RATING_MIN}..={RATING_MAX}, got {rating}"
            )));
        }
        let suggestion_norm = normalize(suggestion);
        if suggestion_norm.is_empty() {
            return Err(Error::InvalidFeedback(
                "selected_suggestion is required".to_string(),
            ));
        }

        let mut profile = self.profiles.entry(user_id.to_string()).or_default();
        profile.feedback_count += 1;
        if let Some(location) = location.map(normalize).filter(|l| !l.is_empty()) {
            *profile.location_counts.entry(location).or_insert(0) += 1;
        }

        if rating >= self.feedback.positive_threshold {
            let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
            let increment = f64::from(rating);
            for token in tokenize(&suggestion_norm) {
                if query_tokens.contains(&token) {
                    *profile.weights.entry(token).or_insert(0.0) += increment;
                }
            }
            *profile.weights.entry(suggestion_norm.clone()).or_insert(0.0) += increment;
            debug!(user_id, suggestion = %suggestion_norm, rating, "reinforced suggestion");
        } else if rating <= self.feedback.negative_threshold {
            profile.negatives.insert(suggestion_norm.clone());
            debug!(user_id, suggestion = %suggestion_norm, rating, "added to negative set");
        }
        Ok(())
    }

    /// Learned boost for a candidate: the weight of its full normalized
    /// text plus the weights of its matching tokens. 0.0 for unknown users.
    pub fn lookup(&self, user_id: &str, candidate_text: &str, tokens: &[String]) -> f64 {
        let Some(profile) = self.profiles.get(user_id) else {
            return 0.0;
        };
        let mut weight = profile
            .weights
            .get(&normalize(candidate_text))
            .copied()
            .unwrap_or(0.0);
        for token in tokens {
            weight += profile.weights.get(token).copied().unwrap_or(0.0);
        }
        weight
    }

    /// True when this user explicitly rejected the suggestion text.
    pub fn is_negative(&self, user_id: &str, text: &str) -> bool {
        self.profiles
            .get(user_id)
            .is_some_and(|p| p.negatives.contains(&normalize(text)))
    }

    pub fn user_count(&self) -> usize {
        self.profiles.len()
    }

    /// Persist all profiles as JSON. Keys are sorted so identical state
    /// serializes identically.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let snapshot: BTreeMap<String, UserProfile> = self
            .profiles
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load persisted profiles. A missing or corrupt state file yields an
    /// empty store; learning starts over rather than failing startup.
    pub fn load(path: &Path, feedback: FeedbackConfig) -> Self {
        let store = Self::new(feedback);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return store,
        };
        match serde_json::from_str::<BTreeMap<String, UserProfile>>(&content) {
            Ok(profiles) => {
                for (user_id, profile) in profiles {
                    store.profiles.insert(user_id, profile);
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "ignoring corrupt preference state");
            }
        }
        store
    }
}
