use std::fs;
use tempfile::TempDir;

use chrono::NaiveDate;
use suggest_core::config::EngineConfig;
use suggest_core::snapshot::{SiteData, SiteSnapshot};
use suggest_core::types::{Member, OpenHours, PlanTier};

#[test]
fn load_dir_reads_sections_and_skips_bad_records() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(
        dir.join("categories.json"),
        r#"[
            {"top_category": "Health", "sub_category": "Doctors"},
            {"missing_top": true},
            {"top_category": "Legal"}
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("members.json"),
        r#"[{"id": "m1", "name": "Dr. John Smith", "tags": ["family doctor"], "rating": 4.8}]"#,
    )
    .unwrap();
    fs::write(dir.join("blocklist.json"), r#"["spam", {"term": "SCAM"}]"#).unwrap();
    fs::write(dir.join("settings.json"), r#"{"radius_km": 25.0}"#).unwrap();

    let snapshot = SiteSnapshot::load_dir(dir).expect("load");

    assert_eq!(snapshot.categories().len(), 2, "malformed record skipped");
    assert_eq!(snapshot.members().len(), 1);
    assert_eq!(snapshot.blocklist(), &["spam".to_string(), "scam".to_string()]);
    assert_eq!(snapshot.settings().radius_km, Some(25.0));
    assert!(!snapshot.is_empty());
}

#[test]
fn load_dir_missing_sections_are_empty() {
    let tmp = TempDir::new().unwrap();
    let snapshot = SiteSnapshot::load_dir(tmp.path()).expect("load empty dir");
    assert!(snapshot.is_empty());
    assert!(snapshot.synonyms().is_empty());
}

#[test]
fn version_marker_tracks_content() {
    let a = SiteSnapshot::from_data(SiteData {
        members: vec![member("m1", "Alice")],
        ..SiteData::default()
    });
    let b = SiteSnapshot::from_data(SiteData {
        members: vec![member("m1", "Alice")],
        ..SiteData::default()
    });
    let c = SiteSnapshot::from_data(SiteData {
        members: vec![member("m2", "Bob")],
        ..SiteData::default()
    });

    assert_eq!(a.version(), b.version(), "identical content, identical version");
    assert_ne!(a.version(), c.version(), "different content, different version");
}

#[test]
fn open_hours_checks_current_weekday() {
    let hours: OpenHours = serde_json::from_str(
        r#"{"mon": [["09:00", "17:00"]], "sat": [["10:00", "12:00"]]}"#,
    )
    .unwrap();

    // 2026-08-03 is a Monday.
    let monday_noon = NaiveDate::from_ymd_opt(2026, 8, 3)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let monday_night = NaiveDate::from_ymd_opt(2026, 8, 3)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap();
    let sunday_noon = NaiveDate::from_ymd_opt(2026, 8, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    assert!(hours.is_open_at(monday_noon));
    assert!(!hours.is_open_at(monday_night));
    assert!(!hours.is_open_at(sunday_noon));
}

#[test]
fn plan_tier_ladder_orders_premium_highest() {
    assert!(PlanTier::Premium > PlanTier::Gold);
    assert!(PlanTier::Gold > PlanTier::Platinum);
    assert!(PlanTier::Platinum > PlanTier::None);
}

#[test]
fn config_defaults_are_sane() {
    let config = EngineConfig::default();
    assert_eq!(config.limits.top_k, 5);
    assert!(config.weights.semantic > config.weights.lexical);
    assert!(config.feedback.negative_threshold < config.feedback.positive_threshold);
    assert!(config.cache.ttl_secs > 0);
}

fn member(id: &str, name: &str) -> Member {
    serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
}
