//! Suggestion ranking & learning engine.
//!
//! One ranking pass: validate → cache probe → candidate generation →
//! lexical (BM25) and semantic (embedding cosine) annotation → signal
//! fusion with personalization, history, geo and business rules →
//! threshold / cold-start → render. Feedback flows through the separate
//! [`SuggestEngine::feedback`] path, the only mutator of learning state.

pub mod cache;
pub mod candidates;
pub mod fusion;
pub mod geo;
pub mod render;
pub mod stats;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tracing::{debug, info, warn};

use suggest_core::config::EngineConfig;
use suggest_core::error::{Error, Result};
use suggest_core::snapshot::SiteSnapshot;
use suggest_core::traits::{Embedder, LexicalScorer};
use suggest_core::types::{QueryContext, RankResponse};
use suggest_embed::{clip_unit, cosine, EmbeddingCache, HashEmbedder};
use suggest_learn::PreferenceStore;
use suggest_text::{normalize, tokenize, Bm25, Intent, SynonymTable};

use crate::cache::SuggestionCache;
use crate::fusion::FusionContext;
use crate::stats::EngineStats;

pub struct SuggestEngine {
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    embed_cache: Arc<EmbeddingCache>,
    lexical: Arc<dyn LexicalScorer>,
    preferences: Arc<PreferenceStore>,
    cache: SuggestionCache,
    stats: EngineStats,
}

impl SuggestEngine {
    /// Engine with the deterministic hashed embedder and a fresh
    /// preference store.
    pub fn new(config: EngineConfig) -> Self {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(config.embedding.dim));
        Self::with_parts(
            config.clone(),
            embedder,
            Arc::new(PreferenceStore::new(config.feedback)),
        )
    }

    /// Default embedder, caller-supplied preference state (e.g. loaded
    /// from disk).
    pub fn with_preferences(config: EngineConfig, preferences: Arc<PreferenceStore>) -> Self {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(config.embedding.dim));
        Self::with_parts(config, embedder, preferences)
    }

    pub fn with_embedder(config: EngineConfig, embedder: Arc<dyn Embedder>) -> Self {
        let preferences = Arc::new(PreferenceStore::new(config.feedback.clone()));
        Self::with_parts(config, embedder, preferences)
    }

    /// Full wiring, e.g. with preference state loaded from disk.
    pub fn with_parts(
        config: EngineConfig,
        embedder: Arc<dyn Embedder>,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        let embed_cache = Arc::new(EmbeddingCache::new(config.embedding.cache_capacity));
        let cache = SuggestionCache::new(config.cache.ttl_secs);
        Self {
            config,
            embedder,
            embed_cache,
            lexical: Arc::new(Bm25::default()),
            preferences,
            cache,
            stats: EngineStats::default(),
        }
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Rank one request against a snapshot. Fails only on validation;
    /// upstream degradation (embedding failure/timeout) falls back to
    /// lexical-only scoring and the cold-start path guarantees a non-empty
    /// suggestion list.
    pub async fn rank(
        &self,
        ctx: &QueryContext,
        snapshot: &SiteSnapshot,
    ) -> Result<RankResponse> {
        let query_norm = normalize(&ctx.query);
        if query_norm.is_empty() {
            return Err(Error::InvalidQuery("query text is required".to_string()));
        }

        let key = cache::fingerprint(
            &query_norm,
            ctx.user_id.as_deref(),
            ctx.coordinate,
            self.config.cache.coord_precision,
            snapshot.version(),
        );
        if let Some(hit) = self.cache.get(key) {
            self.stats.record_cache_hit();
            debug!(query = %query_norm, "suggestion cache hit");
            return Ok((*hit).clone());
        }

        self.stats.record_computation();
        self.stats.record_popularity(&query_norm);

        let synonyms = SynonymTable::from_rules(snapshot.synonyms());
        let expanded = synonyms.expand(&query_norm);
        let intent = Intent::detect(&query_norm);
        let city = resolve_city(&query_norm, ctx.user_location.as_deref(), snapshot);

        let mut candidates = candidates::generate(&expanded, snapshot);
        let mut degraded = false;

        if !candidates.is_empty() {
            let docs: Vec<Vec<String>> = candidates
                .iter()
                .map(|c| tokenize(&c.match_text))
                .collect();
            let lexical_scores = self.lexical.score(&expanded.tokens, &docs);
            for (cand, score) in candidates.iter_mut().zip(&lexical_scores) {
                cand.signals.lexical = *score;
            }

            let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
            match self.semantic_scores(expanded.text.clone(), texts).await {
                Some(scores) => {
                    for (cand, score) in candidates.iter_mut().zip(scores) {
                        cand.signals.semantic = score;
                    }
                }
                None => {
                    degraded = true;
                    self.stats.record_embedding_failure();
                }
            }
        }

        let fusion_ctx = FusionContext {
            config: &self.config,
            preferences: &self.preferences,
            user_id: ctx.user_id.as_deref(),
            history: &ctx.history,
            user_coord: ctx.coordinate,
            radius_km: snapshot.settings().radius_km,
            city: city.as_deref(),
            now: Local::now().naive_local(),
        };
        let ranked = fusion::fuse(candidates, &fusion_ctx);

        let top_k = self.config.limits.top_k;
        let below_threshold = ranked
            .first()
            .is_none_or(|c| c.signals.final_score < self.config.limits.min_score);
        let (suggestions, cards) = if below_threshold {
            debug!(query = %query_norm, "no candidate cleared threshold; cold-start fallback");
            (
                render::cold_start_suggestions(snapshot, &self.stats, top_k),
                Vec::new(),
            )
        } else {
            let user_id = ctx.user_id.as_deref();
            let suppress = |text: &str| {
                user_id.is_some_and(|user| self.preferences.is_negative(user, text))
            };
            (
                render::render_suggestions(&ranked, intent, city.as_deref(), top_k, suppress),
                render::render_cards(&ranked, top_k),
            )
        };

        let response = RankResponse {
            original_query: ctx.query.clone(),
            suggestions,
            cards,
            user_id: ctx.user_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            variant: ctx.variant.clone(),
            debug: ctx.debug.then(|| {
                render::debug_info(
                    intent,
                    city.as_deref(),
                    degraded,
                    &ranked,
                    self.config.limits.debug_top_n,
                )
            }),
        };

        let payload = Arc::new(response);
        self.cache.insert(key, Arc::clone(&payload));
        Ok((*payload).clone())
    }

    /// Ingest one feedback event; the only path that mutates
    /// personalization state. Unknown users are created implicitly.
    pub fn feedback(
        &self,
        user_id: &str,
        query: &str,
        suggestion: &str,
        rating: u8,
        location: Option<&str>,
    ) -> Result<()> {
        self.preferences
            .record_feedback(user_id, query, suggestion, rating, location)?;
        self.stats.record_feedback();
        self.stats.record_popularity(&normalize(suggestion));
        info!(user_id, rating, "feedback recorded");
        Ok(())
    }

    /// Embed the query and all candidate texts off the async runtime,
    /// bounded by the configured timeout. `None` means this request is
    /// scored lexical-only; no lock is held across the embedding calls.
    async fn semantic_scores(
        &self,
        expanded_query: String,
        texts: Vec<String>,
    ) -> Option<Vec<f64>> {
        let embedder = Arc::clone(&self.embedder);
        let embed_cache = Arc::clone(&self.embed_cache);
        let budget = Duration::from_millis(self.config.embedding.timeout_ms);

        let task = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<f64>> {
            let query_vec = embedder.embed(&expanded_query)?;
            let mut scores = Vec::with_capacity(texts.len());
            for text in &texts {
                let vec = embed_cache.get_or_embed(embedder.as_ref(), text)?;
                scores.push(clip_unit(cosine(&query_vec, &vec)));
            }
            Ok(scores)
        });

        match tokio::time::timeout(budget, task).await {
            Ok(Ok(Ok(scores))) => Some(scores),
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "embedding failed; scoring lexical-only");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "embedding task panicked; scoring lexical-only");
                None
            }
            Err(_) => {
                warn!(timeout_ms = budget.as_millis() as u64, "embedding timed out; scoring lexical-only");
                None
            }
        }
    }
}

/// Match the query (then the user's free-text location) against known
/// location entities; first hit wins.
fn resolve_city(
    query_norm: &str,
    user_location: Option<&str>,
    snapshot: &SiteSnapshot,
) -> Option<String> {
    let user_location = user_location.map(normalize);
    for location in snapshot.locations() {
        let name = normalize(&location.name);
        if name.is_empty() {
            continue;
        }
        if query_norm.contains(&name)
            || user_location.as_deref().is_some_and(|ul| ul.contains(&name))
        {
            return Some(location.name.trim().to_string());
        }
    }
    None
}
