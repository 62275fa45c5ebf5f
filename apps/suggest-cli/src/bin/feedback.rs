use std::env;

use suggest_core::config::{expand_path, EngineConfig};
use suggest_learn::PreferenceStore;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        eprintln!(
            "Usage: {} <user_id> <query> <selected_suggestion> <rating 1-5> [state_path]",
            args[0]
        );
        eprintln!(
            "Example: {} user-42 'doctor near me' 'Top-rated family doctor near you' 5",
            args[0]
        );
        std::process::exit(1);
    }
    let user_id = &args[1];
    let query = &args[2];
    let suggestion = &args[3];
    let rating: u8 = args[4]
        .parse()
        .map_err(|_| anyhow::anyhow!("rating must be a number between 1 and 5"))?;
    let state_path = args
        .get(5)
        .map(|p| expand_path(p))
        .unwrap_or_else(|| expand_path("preferences.json"));

    let config = EngineConfig::load()?;
    let store = PreferenceStore::load(&state_path, config.feedback);
    store.record_feedback(user_id, query, suggestion, rating, None)?;
    store.save(&state_path)?;

    println!(
        "{}",
        serde_json::json!({ "status": "feedback_received", "user_id": user_id })
    );
    Ok(())
}
