//! Signal fusion and business rules.
//!
//! Combines lexical, semantic, personalization, history, geo and business
//! signals into one final score per candidate, applies the geo radius
//! filter and sorts with deterministic tie-breaks.

use chrono::NaiveDateTime;

use suggest_core::config::EngineConfig;
use suggest_core::types::{Candidate, Coordinate, Member, PlanTier};
use suggest_learn::PreferenceStore;
use suggest_text::tokenize;

use crate::geo::haversine_km;

pub struct FusionContext<'a> {
    pub config: &'a EngineConfig,
    pub preferences: &'a PreferenceStore,
    pub user_id: Option<&'a str>,
    /// Recent queries, most recent last; only the configured window is
    /// consulted.
    pub history: &'a [String],
    pub user_coord: Option<Coordinate>,
    pub radius_km: Option<f64>,
    pub city: Option<&'a str>,
    pub now: NaiveDateTime,
}

/// Fuse pre-annotated lexical/semantic signals with the remaining boosts,
/// drop candidates outside the geo radius and sort. Candidates arrive with
/// `signals.lexical` and `signals.semantic` already set.
pub fn fuse(mut candidates: Vec<Candidate>, ctx: &FusionContext<'_>) -> Vec<Candidate> {
    normalize_lexical(&mut candidates);

    let weights = &ctx.config.weights;
    let history: Vec<&String> = ctx
        .history
        .iter()
        .rev()
        .take(ctx.config.limits.history_window)
        .collect();

    let mut fused: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for mut cand in candidates {
        // Geo first: the radius filter can drop the candidate outright.
        let candidate_coord = cand.member.as_deref().and_then(Member::coordinate);
        if let (Some(user), Some(here)) = (ctx.user_coord, candidate_coord) {
            let distance = haversine_km(user, here);
            cand.distance_km = Some(distance);
            match ctx.radius_km {
                Some(radius) if distance > radius => continue,
                Some(radius) => {
                    cand.signals.geo_boost = weights.geo_max * (1.0 - distance / radius);
                }
                // Without a configured radius closer still wins, on a
                // fixed decay scale.
                None => cand.signals.geo_boost = weights.geo_max / (1.0 + distance),
            }
        }
        // Text-level geography: a resolved city appearing in the member's
        // location counts even when coordinates are missing on either side.
        if let (Some(city), Some(member)) = (ctx.city, cand.member.as_deref()) {
            if member
                .location
                .to_lowercase()
                .contains(&city.to_lowercase())
            {
                cand.signals.geo_boost += weights.location_match;
            }
        }

        cand.signals.history_boost = history_boost(&cand, &history, weights.history);

        if let Some(user_id) = ctx.user_id {
            let tokens = tokenize(&cand.text);
            let learned = ctx.preferences.lookup(user_id, &cand.text, &tokens);
            cand.signals.personalization_boost = weights.learned * (learned / 10.0);
            if ctx.preferences.is_negative(user_id, &cand.text) {
                cand.signals.negative_penalty = weights.negative_penalty;
            }
        }

        cand.signals.business_boost = business_boost(&cand, ctx);

        cand.signals.final_score = weights.semantic * cand.signals.semantic
            + weights.lexical * cand.signals.lexical_norm
            + cand.signals.personalization_boost
            + cand.signals.history_boost
            + cand.signals.geo_boost
            + cand.signals.business_boost
            - cand.signals.negative_penalty;
        fused.push(cand);
    }

    // Deterministic order: score desc, then rating desc, then entity id asc.
    fused.sort_by(|a, b| {
        b.signals
            .final_score
            .total_cmp(&a.signals.final_score)
            .then_with(|| {
                b.rating
                    .unwrap_or(0.0)
                    .total_cmp(&a.rating.unwrap_or(0.0))
            })
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    fused
}

/// Min-max rescale of raw BM25 scores into the semantic signal's order of
/// magnitude. An all-equal set rescales to 0.0 for everyone.
fn normalize_lexical(candidates: &mut [Candidate]) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for cand in candidates.iter() {
        min = min.min(cand.signals.lexical);
        max = max.max(cand.signals.lexical);
    }
    let span = max - min;
    if !span.is_finite() || span <= f64::EPSILON {
        return;
    }
    for cand in candidates.iter_mut() {
        cand.signals.lexical_norm = (cand.signals.lexical - min) / span;
    }
}

/// Recency-weighted history match: the most recent entry weighs 1.0,
/// decaying linearly to 1/n across the inspected window.
fn history_boost(cand: &Candidate, history: &[&String], weight: f64) -> f64 {
    let n = history.len();
    if n == 0 {
        return 0.0;
    }
    let mut boost = 0.0;
    for (recency, entry) in history.iter().enumerate() {
        let entry = entry.to_lowercase();
        if entry.is_empty() || !cand.match_text.contains(&entry) {
            continue;
        }
        let decay = (n - recency) as f64 / n as f64;
        boost += weight * decay;
    }
    boost
}

fn business_boost(cand: &Candidate, ctx: &FusionContext<'_>) -> f64 {
    let weights = &ctx.config.weights;
    let mut boost = 0.0;
    if cand.rating.unwrap_or(0.0) >= ctx.config.limits.high_rating {
        boost += weights.rating;
    }
    let Some(member) = cand.member.as_deref() else {
        return boost;
    };
    if member.featured {
        boost += weights.featured;
    }
    boost += match member.plan_level {
        PlanTier::Premium => weights.plan_premium,
        PlanTier::Gold => weights.plan_gold,
        PlanTier::Platinum => weights.plan_platinum,
        PlanTier::None => 0.0,
    };
    boost += weights.priority * member.priority_score;
    if member
        .hours
        .as_ref()
        .is_some_and(|h| h.is_open_at(ctx.now))
    {
        boost += weights.open_now;
    }
    if member.promo_badge.is_some() {
        boost += weights.promo;
    }
    boost
}
