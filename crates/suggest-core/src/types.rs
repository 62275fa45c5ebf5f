//! Domain types shared by the candidate, scoring and rendering stages.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub type EntityId = String;

/// WGS84 point used for user and member positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Paid plan ladder. Ordering matters: `Premium` earns the largest
/// business boost, `None` earns nothing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    None,
    Platinum,
    Gold,
    Premium,
}

/// Weekly opening hours keyed by `"mon".."sun"`, each day holding
/// `["HH:MM", "HH:MM"]` intervals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenHours(pub HashMap<String, Vec<(String, String)>>);

impl OpenHours {
    const DAY_KEYS: [&'static str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

    /// True when `now` falls inside a declared interval for its weekday.
    /// Interval bounds are compared as zero-padded `HH:MM` strings.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        let day = Self::DAY_KEYS[now.weekday().num_days_from_monday() as usize];
        let current = now.format("%H:%M").to_string();
        self.0
            .get(day)
            .is_some_and(|intervals| {
                intervals
                    .iter()
                    .any(|(start, end)| start.as_str() <= current.as_str() && current.as_str() <= end.as_str())
            })
    }
}

/// A business/professional listing supplied by the entity store.
///
/// - `tags`: free-text descriptors searched alongside the name
/// - `priority_score`: operator-assigned linear ranking contribution
/// - `hours`: opening schedule consulted by the "open now" rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub plan_level: PlanTier,
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default)]
    pub promo_badge: Option<String>,
    #[serde(default)]
    pub hours: Option<OpenHours>,
}

impl Member {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
            _ => None,
        }
    }
}

/// Three-level directory category (top, sub, sub-sub).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub top_category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub sub_sub_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profession {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEntity {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
}

/// One-to-many ontology rule: a query containing `base` also matches
/// any of `terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymRule {
    pub base: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub radius_km: Option<f64>,
}

/// Per-request context. Constructed fresh per request, never persisted
/// by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryContext {
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Prior query strings, most recent last.
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub user_location: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub debug: bool,
    /// Experiment-variant label, echoed through untouched.
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Category,
    Subcategory,
    SubSubcategory,
    Member,
    Tag,
    Profession,
    Location,
    Synthetic,
}

/// Per-candidate scoring bag. All signals start at zero and are filled
/// in by the lexical, semantic and fusion stages of one ranking pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Signals {
    pub lexical: f64,
    pub lexical_norm: f64,
    pub semantic: f64,
    pub history_boost: f64,
    pub geo_boost: f64,
    pub business_boost: f64,
    pub personalization_boost: f64,
    pub negative_penalty: f64,
    pub final_score: f64,
}

/// A suggestion/entity pairing considered for ranking in one request.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Display text rendered into suggestions.
    pub text: String,
    /// Lowercased text used for token overlap and lexical scoring; for
    /// members this also folds in tags and location so a tag hit
    /// surfaces the member.
    pub match_text: String,
    pub kind: CandidateKind,
    pub entity_id: EntityId,
    pub rating: Option<f64>,
    /// Source member snapshot, present for member-derived candidates.
    pub member: Option<Arc<Member>>,
    pub signals: Signals,
    pub distance_km: Option<f64>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, kind: CandidateKind, entity_id: impl Into<EntityId>) -> Self {
        let text = text.into();
        let match_text = text.to_lowercase();
        Self {
            text,
            match_text,
            kind,
            entity_id: entity_id.into(),
            rating: None,
            member: None,
            signals: Signals::default(),
            distance_km: None,
        }
    }
}

/// Card emitted for member-backed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberCard {
    pub title: String,
    pub member_id: EntityId,
    pub profile_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub rating: Option<f64>,
    pub location: String,
    pub distance_km: Option<f64>,
    pub promo_badge: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugCandidate {
    pub text: String,
    pub kind: CandidateKind,
    pub final_score: f64,
    pub lexical: f64,
    pub lexical_norm: f64,
    pub semantic: f64,
    pub history_boost: f64,
    pub geo_boost: f64,
    pub business_boost: f64,
    pub personalization_boost: f64,
    pub negative_penalty: f64,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub intent: String,
    pub city: Option<String>,
    /// Set when the embedding call failed or timed out and the pass was
    /// scored lexical-only.
    pub degraded_to_lexical: bool,
    pub top_candidates: Vec<DebugCandidate>,
}

/// Full response of the rank operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResponse {
    pub original_query: String,
    pub suggestions: Vec<String>,
    pub cards: Vec<MemberCard>,
    pub user_id: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}
