//! Immutable site-data snapshot and its JSON directory loader.
//!
//! A snapshot is the read-only view the engine ranks against: categories,
//! members, professions, locations, the synonym table and block/allow
//! lists. The `version` marker (content hash) ties cached responses to the
//! exact data they were computed from.

use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use std::path::Path;
use tracing::warn;
use twox_hash::XxHash64;

use crate::error::{Error, Result};
use crate::types::{Category, LocationEntity, Member, Profession, SiteSettings, SynonymRule};

/// Raw site data as supplied inline with a rank request or read from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteData {
    pub categories: Vec<Category>,
    pub members: Vec<Member>,
    pub professions: Vec<Profession>,
    pub locations: Vec<LocationEntity>,
    pub synonyms: Vec<SynonymRule>,
    pub blocklist: Vec<String>,
    pub allowlist: Vec<String>,
    pub settings: SiteSettings,
}

/// Immutable snapshot plus its content-hash version marker.
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    data: SiteData,
    version: u64,
}

impl SiteSnapshot {
    pub fn from_data(mut data: SiteData) -> Self {
        for term in data.blocklist.iter_mut().chain(data.allowlist.iter_mut()) {
            *term = term.to_lowercase();
        }
        let version = content_version(&data);
        Self { data, version }
    }

    /// Load a snapshot from a directory of JSON section files
    /// (`categories.json`, `members.json`, ...). Missing files yield empty
    /// sections; malformed individual records are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Snapshot(format!(
                "not a directory: {}",
                dir.display()
            )));
        }
        let mut data = SiteData::default();
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            match name.as_str() {
                "categories.json" => data.categories = read_records(path),
                "members.json" => data.members = read_records(path),
                "professions.json" => data.professions = read_records(path),
                "locations.json" => data.locations = read_records(path),
                "synonyms.json" => data.synonyms = read_records(path),
                "blocklist.json" => data.blocklist = read_terms(path),
                "allowlist.json" => data.allowlist = read_terms(path),
                "settings.json" => data.settings = read_settings(path),
                _ => {}
            }
        }
        Ok(Self::from_data(data))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// True when there is nothing to generate candidates from.
    pub fn is_empty(&self) -> bool {
        self.data.categories.is_empty()
            && self.data.members.is_empty()
            && self.data.professions.is_empty()
            && self.data.locations.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub fn members(&self) -> &[Member] {
        &self.data.members
    }

    pub fn professions(&self) -> &[Profession] {
        &self.data.professions
    }

    pub fn locations(&self) -> &[LocationEntity] {
        &self.data.locations
    }

    pub fn synonyms(&self) -> &[SynonymRule] {
        &self.data.synonyms
    }

    pub fn blocklist(&self) -> &[String] {
        &self.data.blocklist
    }

    pub fn allowlist(&self) -> &[String] {
        &self.data.allowlist
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.data.settings
    }
}

fn content_version(data: &SiteData) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    // Serialization of the full snapshot is stable for identical content.
    let serialized = serde_json::to_vec(data).unwrap_or_default();
    hasher.write(&serialized);
    hasher.finish()
}

/// Read a JSON array of records, skipping elements that fail to
/// deserialize instead of rejecting the whole file.
fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    let values: Vec<serde_json::Value> = match read_json(path) {
        Some(v) => v,
        None => return Vec::new(),
    };
    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping malformed record"),
        }
    }
    records
}

/// Block/allow list entries: either a bare string or `{"term": "..."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TermEntry {
    Plain(String),
    Keyed { term: String },
}

fn read_terms(path: &Path) -> Vec<String> {
    let entries: Vec<TermEntry> = match read_json(path) {
        Some(v) => v,
        None => return Vec::new(),
    };
    entries
        .into_iter()
        .map(|e| match e {
            TermEntry::Plain(term) | TermEntry::Keyed { term } => term,
        })
        .filter(|t| !t.trim().is_empty())
        .collect()
}

fn read_settings(path: &Path) -> SiteSettings {
    read_json(path).unwrap_or_default()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to read snapshot file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to parse snapshot file");
            None
        }
    }
}
