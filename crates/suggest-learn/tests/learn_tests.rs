use std::sync::Arc;

use suggest_core::config::FeedbackConfig;
use suggest_learn::PreferenceStore;
use suggest_text::tokenize;

fn store() -> PreferenceStore {
    PreferenceStore::new(FeedbackConfig::default())
}

#[test]
fn high_rating_reinforces_shared_terms() {
    let store = store();
    store
        .record_feedback("u1", "doctor near me", "Top-rated doctor near you", 5, None)
        .expect("record");

    // shared terms "doctor" and "near" each earn the rating, as does the
    // full suggestion text
    assert_eq!(store.lookup("u1", "doctor", &[]), 5.0);
    assert_eq!(store.lookup("u1", "near", &[]), 5.0);
    assert_eq!(store.lookup("u1", "you", &[]), 0.0, "unshared term not learned");
    let boost = store.lookup("u1", "Top-rated doctor near you", &tokenize("doctor"));
    assert_eq!(boost, 10.0, "full text plus matching token");
    assert_eq!(store.lookup("other-user", "doctor", &[]), 0.0);
}

#[test]
fn low_rating_populates_negative_set() {
    let store = store();
    store
        .record_feedback("u1", "doctor near me", "Best doctor in Springfield", 1, None)
        .expect("record");

    assert!(store.is_negative("u1", "Best doctor in Springfield"));
    assert!(store.is_negative("u1", "best doctor in springfield"), "normalized match");
    assert!(!store.is_negative("u2", "Best doctor in Springfield"));
}

#[test]
fn mid_rating_neither_reinforces_nor_suppresses() {
    let store = store();
    store
        .record_feedback("u1", "doctor", "Trusted doctor nearby", 3, None)
        .expect("record");

    assert_eq!(store.lookup("u1", "Trusted doctor nearby", &[]), 0.0);
    assert!(!store.is_negative("u1", "Trusted doctor nearby"));
    assert_eq!(store.user_count(), 1, "profile still created");
}

#[test]
fn rating_out_of_scale_is_rejected() {
    let store = store();
    assert!(store.record_feedback("u1", "q", "s", 0, None).is_err());
    assert!(store.record_feedback("u1", "q", "s", 6, None).is_err());
}

#[test]
fn unknown_user_is_created_implicitly() {
    let store = store();
    assert_eq!(store.user_count(), 0);
    store
        .record_feedback("brand-new", "plumber", "Trusted plumber nearby", 4, Some("Springfield"))
        .expect("record");
    assert_eq!(store.user_count(), 1);
}

#[test]
fn save_and_load_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("prefs.json");

    let store = store();
    store
        .record_feedback("u1", "doctor near me", "Top-rated doctor near you", 5, None)
        .expect("record");
    store
        .record_feedback("u1", "doctor near me", "Best doctor in town", 1, None)
        .expect("record");
    store.save(&path).expect("save");

    let loaded = PreferenceStore::load(&path, FeedbackConfig::default());
    assert!(loaded.lookup("u1", "Top-rated doctor near you", &[]) > 0.0);
    assert!(loaded.is_negative("u1", "Best doctor in town"));
}

#[test]
fn load_missing_or_corrupt_state_starts_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let missing = PreferenceStore::load(&tmp.path().join("nope.json"), FeedbackConfig::default());
    assert_eq!(missing.user_count(), 0);

    let corrupt_path = tmp.path().join("bad.json");
    std::fs::write(&corrupt_path, "{not json").unwrap();
    let corrupt = PreferenceStore::load(&corrupt_path, FeedbackConfig::default());
    assert_eq!(corrupt.user_count(), 0);
}

#[test]
fn concurrent_feedback_and_lookup_lose_no_updates() {
    let store = Arc::new(store());
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    store
                        .record_feedback("shared", "doctor", "doctor visit", 5, None)
                        .expect("record");
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let w = store.lookup("shared", "doctor visit", &[]);
                    assert!(w >= 0.0);
                }
            })
        })
        .collect();
    for t in writers.into_iter().chain(readers) {
        t.join().expect("thread");
    }

    // 4 threads x 50 events x rating 5 on the full text
    assert_eq!(store.lookup("shared", "doctor visit", &[]), 1000.0);
}
