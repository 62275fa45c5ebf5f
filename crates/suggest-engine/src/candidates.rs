//! Candidate generation: expands the site snapshot into the set of
//! suggestion/entity pairings considered for one ranking pass.
//!
//! Pure function of its inputs; an empty snapshot yields an empty set and
//! lets the cold-start fallback fire downstream.

use std::collections::HashSet;
use std::sync::Arc;

use suggest_core::snapshot::SiteSnapshot;
use suggest_core::types::{Candidate, CandidateKind};
use suggest_text::{tokenize, ExpandedQuery};

const SYNTHETIC_TEMPLATE: &str = "Top-rated {base} near you";

pub fn generate(expanded: &ExpandedQuery, snapshot: &SiteSnapshot) -> Vec<Candidate> {
    if snapshot.is_empty() {
        return Vec::new();
    }

    let tokens: HashSet<&str> = expanded.tokens.iter().map(String::as_str).collect();
    let filter = OverlapFilter {
        tokens,
        blocklist: snapshot.blocklist(),
        allowlist: snapshot.allowlist(),
    };

    let mut out: Vec<Candidate> = Vec::new();
    let mut seed_bases: Vec<String> = Vec::new();

    for cat in snapshot.categories() {
        let top = cat.top_category.trim();
        if top.is_empty() {
            continue;
        }
        push_category(&mut out, &mut seed_bases, &filter, top, CandidateKind::Category);
        if let Some(sub) = cat.sub_category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let text = format!("{top} - {sub}");
            push_category(&mut out, &mut seed_bases, &filter, &text, CandidateKind::Subcategory);
            if let Some(subsub) = cat
                .sub_sub_category
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                let text = format!("{top} - {sub} - {subsub}");
                push_category(
                    &mut out,
                    &mut seed_bases,
                    &filter,
                    &text,
                    CandidateKind::SubSubcategory,
                );
            }
        }
    }

    for member in snapshot.members() {
        let name = member.name.trim();
        if name.is_empty() {
            continue;
        }
        // The member candidate matches on name, tags and location so a
        // query hitting only a tag still surfaces the member itself.
        let mut match_text = name.to_lowercase();
        for tag in &member.tags {
            match_text.push(' ');
            match_text.push_str(&tag.to_lowercase());
        }
        if !member.location.is_empty() {
            match_text.push(' ');
            match_text.push_str(&member.location.to_lowercase());
        }
        // The veto is entity-level: a blocklisted member never surfaces,
        // not even through one of its tags.
        if filter.blocked(&match_text) {
            continue;
        }

        let member = Arc::new(member.clone());
        let mut cand = Candidate::new(name, CandidateKind::Member, entity_id(&member.id, name));
        cand.match_text = match_text;
        cand.rating = member.rating;
        cand.member = Some(Arc::clone(&member));
        if filter.matches(&cand.match_text) {
            out.push(cand);
        }

        for tag in member.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let mut cand = Candidate::new(tag, CandidateKind::Tag, entity_id(&member.id, name));
            cand.rating = member.rating;
            cand.member = Some(Arc::clone(&member));
            if filter.matches(&cand.match_text) {
                out.push(cand);
            }
        }
    }

    for profession in snapshot.professions() {
        let name = profession.name.trim();
        if name.is_empty() {
            continue;
        }
        let cand = Candidate::new(name, CandidateKind::Profession, entity_id(&profession.id, name));
        if filter.keeps(&cand.match_text) {
            seed_bases.push(cand.text.clone());
            out.push(cand);
        }
    }

    for location in snapshot.locations() {
        let name = location.name.trim();
        if name.is_empty() {
            continue;
        }
        let cand = Candidate::new(name, CandidateKind::Location, entity_id(&location.id, name));
        if filter.keeps(&cand.match_text) {
            out.push(cand);
        }
    }

    // Synthetic suggestions seeded from the categories/professions the
    // query actually matched.
    for base in seed_bases {
        let text = SYNTHETIC_TEMPLATE.replace("{base}", &base);
        let cand = Candidate::new(text, CandidateKind::Synthetic, base.to_lowercase());
        if !filter.blocked(&cand.match_text) {
            out.push(cand);
        }
    }

    dedup_by_text(out)
}

struct OverlapFilter<'a> {
    tokens: HashSet<&'a str>,
    blocklist: &'a [String],
    allowlist: &'a [String],
}

impl OverlapFilter<'_> {
    fn blocked(&self, match_text: &str) -> bool {
        self.blocklist.iter().any(|term| match_text.contains(term.as_str()))
    }

    /// Minimum token overlap with an allowlist bypass; assumes the
    /// blocklist veto already ran.
    fn matches(&self, match_text: &str) -> bool {
        if self.allowlist.iter().any(|term| match_text.contains(term.as_str())) {
            return true;
        }
        tokenize(match_text)
            .iter()
            .any(|token| self.tokens.contains(token.as_str()))
    }

    /// Blocklist veto first, then minimum token overlap with an allowlist
    /// bypass.
    fn keeps(&self, match_text: &str) -> bool {
        !self.blocked(match_text) && self.matches(match_text)
    }
}

fn push_category(
    out: &mut Vec<Candidate>,
    seed_bases: &mut Vec<String>,
    filter: &OverlapFilter<'_>,
    text: &str,
    kind: CandidateKind,
) {
    let cand = Candidate::new(text, kind, text.to_lowercase());
    if filter.keeps(&cand.match_text) {
        seed_bases.push(cand.text.clone());
        out.push(cand);
    }
}

fn entity_id(id: &str, fallback: &str) -> String {
    if id.trim().is_empty() {
        fallback.to_lowercase()
    } else {
        id.to_string()
    }
}

fn dedup_by_text(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.text.to_lowercase()))
        .collect()
}
