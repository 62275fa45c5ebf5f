//! Turns ranked candidates into user-facing suggestion strings and member
//! cards, plus the cold-start fallback and the debug block.

use suggest_core::snapshot::SiteSnapshot;
use suggest_core::types::{Candidate, DebugCandidate, DebugInfo, MemberCard};
use suggest_text::{normalize, Intent};

use crate::stats::EngineStats;

pub const COLD_START_DEFAULT: &str = "Popular services near you";

/// Instantiate the intent's templates with the top candidates. Templates
/// needing `{city}` are skipped when no city resolved; suggestions in the
/// user's negative set are suppressed; output is deduplicated by lowercase
/// text and capped at `top_k`.
pub fn render_suggestions(
    ranked: &[Candidate],
    intent: Intent,
    city: Option<&str>,
    top_k: usize,
    suppress: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(top_k);
    'outer: for cand in ranked.iter().take(top_k) {
        for template in intent.templates() {
            let needs_city = template.contains("{city}");
            if needs_city && city.is_none() {
                continue;
            }
            let mut text = template.replace("{base}", &cand.text);
            if let Some(city) = city {
                text = text.replace("{city}", city);
            }
            if suppress(&text) {
                continue;
            }
            if seen.insert(text.to_lowercase()) {
                out.push(text);
            }
            if out.len() >= top_k {
                break 'outer;
            }
        }
    }
    out
}

/// Cards for member-backed candidates among the top ranks, deduplicated by
/// member id. Distances are rounded to two decimals for display.
pub fn render_cards(ranked: &[Candidate], top_k: usize) -> Vec<MemberCard> {
    let mut seen = std::collections::HashSet::new();
    let mut cards = Vec::new();
    for cand in ranked.iter().take(top_k) {
        let Some(member) = cand.member.as_deref() else {
            continue;
        };
        if member.id.is_empty() && member.profile_url.is_none() {
            continue;
        }
        if !seen.insert(member.id.clone()) {
            continue;
        }
        cards.push(MemberCard {
            title: member.name.clone(),
            member_id: member.id.clone(),
            profile_url: member.profile_url.clone(),
            thumbnail_url: member.thumbnail_url.clone(),
            rating: member.rating,
            location: member.location.clone(),
            distance_km: cand.distance_km.map(|d| (d * 100.0).round() / 100.0),
            promo_badge: member.promo_badge.clone(),
            featured: member.featured,
        });
    }
    cards
}

/// Non-personalized, non-geo-filtered fallback: globally popular
/// categories and professions, by popularity counter then snapshot order.
/// The only path guaranteed to return a non-empty list.
pub fn cold_start_suggestions(
    snapshot: &SiteSnapshot,
    stats: &EngineStats,
    top_k: usize,
) -> Vec<String> {
    let mut entries: Vec<(u64, usize, String)> = Vec::new();
    let mut names: Vec<String> = snapshot
        .categories()
        .iter()
        .map(|c| c.top_category.trim().to_string())
        .collect();
    names.extend(
        snapshot
            .professions()
            .iter()
            .map(|p| p.name.trim().to_string()),
    );
    let mut seen = std::collections::HashSet::new();
    for (index, name) in names.into_iter().enumerate() {
        if name.is_empty() || !seen.insert(name.to_lowercase()) {
            continue;
        }
        let count = stats.popularity_of(&normalize(&name));
        entries.push((count, index, name));
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut out: Vec<String> = entries.into_iter().take(top_k).map(|e| e.2).collect();
    if out.is_empty() {
        out.push(COLD_START_DEFAULT.to_string());
    }
    out
}

pub fn debug_info(
    intent: Intent,
    city: Option<&str>,
    degraded_to_lexical: bool,
    ranked: &[Candidate],
    top_n: usize,
) -> DebugInfo {
    DebugInfo {
        intent: intent.as_str().to_string(),
        city: city.map(str::to_string),
        degraded_to_lexical,
        top_candidates: ranked
            .iter()
            .take(top_n)
            .map(|c| DebugCandidate {
                text: c.text.clone(),
                kind: c.kind,
                final_score: c.signals.final_score,
                lexical: c.signals.lexical,
                lexical_norm: c.signals.lexical_norm,
                semantic: c.signals.semantic,
                history_boost: c.signals.history_boost,
                geo_boost: c.signals.geo_boost,
                business_boost: c.signals.business_boost,
                personalization_boost: c.signals.personalization_boost,
                negative_penalty: c.signals.negative_penalty,
                distance_km: c.distance_km,
            })
            .collect(),
    }
}
