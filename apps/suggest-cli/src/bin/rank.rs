use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use suggest_core::config::{expand_path, EngineConfig};
use suggest_core::snapshot::SiteSnapshot;
use suggest_core::types::QueryContext;
use suggest_engine::SuggestEngine;
use suggest_learn::PreferenceStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [site_data_dir] [user_id]", args[0]);
        eprintln!("Example: {} 'doctor near me' ./site_data user-42", args[0]);
        std::process::exit(1);
    }
    let query = args[1].clone();
    let site_dir = args
        .get(2)
        .map(|p| expand_path(p))
        .unwrap_or_else(|| PathBuf::from("./site_data"));
    let user_id = args.get(3).cloned();

    let config = EngineConfig::load()?;
    let snapshot = SiteSnapshot::load_dir(&site_dir)?;
    let state_path = expand_path(
        env::var("APP_STATE_PATH").unwrap_or_else(|_| "preferences.json".to_string()),
    );
    let preferences = Arc::new(PreferenceStore::load(&state_path, config.feedback.clone()));
    let engine = SuggestEngine::with_preferences(config, preferences);

    let ctx = QueryContext {
        query,
        user_id,
        debug: env::var("APP_DEBUG").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        ..QueryContext::default()
    };
    let response = engine.rank(&ctx, &snapshot).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
