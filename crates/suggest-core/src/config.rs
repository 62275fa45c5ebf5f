//! Configuration loading and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars into a typed [`EngineConfig`]. Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Signal weights applied during fusion. Defaults mirror the tuning the
/// service shipped with; every field can be overridden from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub semantic: f64,
    pub lexical: f64,
    pub history: f64,
    pub rating: f64,
    pub location_match: f64,
    pub learned: f64,
    pub featured: f64,
    pub plan_premium: f64,
    pub plan_gold: f64,
    pub plan_platinum: f64,
    pub priority: f64,
    pub open_now: f64,
    pub promo: f64,
    pub geo_max: f64,
    pub negative_penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            lexical: 0.3,
            history: 0.1,
            rating: 0.1,
            location_match: 0.1,
            learned: 0.15,
            featured: 0.1,
            plan_premium: 0.12,
            plan_gold: 0.08,
            plan_platinum: 0.04,
            priority: 0.05,
            open_now: 0.05,
            promo: 0.03,
            geo_max: 0.15,
            negative_penalty: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Suggestions and cards returned per request.
    pub top_k: usize,
    /// Candidates listed in debug output.
    pub debug_top_n: usize,
    /// Minimum top score below which the cold-start fallback fires.
    pub min_score: f64,
    /// Most recent history entries consulted for the history boost.
    pub history_window: usize,
    /// Rating at or above which the high-rating boost applies.
    pub high_rating: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            top_k: 5,
            debug_top_n: 10,
            min_score: 0.05,
            history_window: 10,
            high_rating: 4.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dim: usize,
    /// Budget for one embedding call; on timeout the request degrades to
    /// lexical-only scoring.
    pub timeout_ms: u64,
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dim: 384,
            timeout_ms: 250,
            cache_capacity: 2048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Decimal places user coordinates are rounded to before entering the
    /// cache fingerprint.
    pub coord_precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            coord_precision: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Ratings at or above this (1-5 scale) reinforce shared terms.
    pub positive_threshold: u8,
    /// Ratings at or below this add the suggestion to the negative set.
    pub negative_threshold: u8,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 4,
            negative_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: Weights,
    pub limits: Limits,
    pub embedding: EmbeddingConfig,
    pub cache: CacheConfig,
    pub feedback: FeedbackConfig,
}

impl EngineConfig {
    /// Load from `config.toml`, the `RUST_ENV`-selected overlay and `APP_*`
    /// env vars, on top of the built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.limits.top_k == 0 {
            anyhow::bail!("limits.top_k must be positive");
        }
        if self.embedding.dim == 0 {
            anyhow::bail!("embedding.dim must be positive");
        }
        if self.feedback.negative_threshold >= self.feedback.positive_threshold {
            anyhow::bail!("feedback.negative_threshold must be below positive_threshold");
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
