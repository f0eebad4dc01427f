//! Remote candidate ranking.
//!
//! An external food database returns loosely-matching products for a query.
//! This module cleans up their names, throws away records with no nutrient
//! data, scores the rest against the query and keeps a short ranked list so the
//! caller can auto-select the best one or let the user override it.
//!
//! The lookup itself sits behind the [`FoodLookup`] trait. Any failure there is
//! absorbed here and reported as "no candidates"; it never reaches the caller.

use crate::config::settings::RankingSettings;
use crate::core::nutrients::NutrientRecord;
use crate::core::text::{jaccard, normalize, tokens};
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default share of non-Latin letters above which a name is unusable.
pub const NON_LATIN_THRESHOLD: f64 = 0.35;

/// A raw product record from a remote lookup, before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Product name in whatever language the database holds
    pub name: Option<String>,
    /// English product name, when the database has one
    pub name_en: Option<String>,
    /// Brand or manufacturer
    pub brand: Option<String>,
    /// Nutrients per 100 g, absent fields already zeroed
    pub nutrients: NutrientRecord,
}

/// A candidate that survived filtering, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Name to show the user
    pub display_name: String,
    /// Brand, if any
    pub brand: Option<String>,
    /// Nutrients per 100 g
    pub record: NutrientRecord,
    /// Ranking score, higher is better
    pub score: f64,
}

/// Result of ranking a candidate list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedCandidates {
    /// Top candidates in descending score order
    pub options: Vec<ScoredCandidate>,
}

impl RankedCandidates {
    /// The automatically selected candidate.
    #[must_use]
    pub fn best(&self) -> Option<&ScoredCandidate> {
        self.options.first()
    }

    /// Manual override: the candidate at `index` in the shortlist.
    #[must_use]
    pub fn select(&self, index: usize) -> Option<&ScoredCandidate> {
        self.options.get(index)
    }

    /// True when nothing survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Source of remote candidates, e.g. an HTTP client for a public food database.
#[async_trait]
pub trait FoodLookup: Send + Sync {
    /// Returns zero or more candidates for a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;
}

/// Whether `text` can be shown as-is, using [`NON_LATIN_THRESHOLD`].
#[must_use]
pub fn is_display_name_usable(text: &str) -> bool {
    is_display_name_usable_with(text, NON_LATIN_THRESHOLD)
}

/// Whether `text` has at least one letter and its share of non-Latin letters
/// does not exceed `threshold`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_display_name_usable_with(text: &str, threshold: f64) -> bool {
    let (latin, other) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(latin, other), c| {
            if is_latin_letter(c) {
                (latin + 1, other)
            } else {
                (latin, other + 1)
            }
        });

    let letters = latin + other;
    if letters == 0 {
        return false;
    }
    (other as f64 / letters as f64) <= threshold
}

fn is_latin_letter(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z'
        | '\u{00C0}'..='\u{024F}'
        | '\u{1E00}'..='\u{1EFF}')
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Picks the name to display for a candidate.
///
/// Prefers the English name, then the generic name, skipping either when it is
/// mostly non-Latin. Falls back to the query text with the brand appended.
#[must_use]
pub fn display_name(candidate: &Candidate, query: &str, threshold: f64) -> String {
    let usable = |s: &&str| is_display_name_usable_with(s, threshold);

    if let Some(name) = non_blank(candidate.name_en.as_ref())
        .filter(usable)
        .or_else(|| non_blank(candidate.name.as_ref()).filter(usable))
    {
        return name.to_string();
    }

    let query = query.trim();
    match non_blank(candidate.brand.as_ref()).filter(usable) {
        Some(brand) => format!("{query} - {brand}"),
        None => query.to_string(),
    }
}

/// Text a candidate is scored on: its own name (English first) and brand.
///
/// Unlike [`display_name`] this never substitutes the query, so a candidate
/// with an unreadable name cannot match the query by construction.
#[must_use]
pub fn candidate_text(candidate: &Candidate) -> String {
    let name = non_blank(candidate.name_en.as_ref()).or_else(|| non_blank(candidate.name.as_ref()));
    let brand = non_blank(candidate.brand.as_ref());
    match (name, brand) {
        (Some(name), Some(brand)) => format!("{name} {brand}"),
        (Some(text), None) | (None, Some(text)) => text.to_string(),
        (None, None) => String::new(),
    }
}

/// Scores one candidate's text against the query.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_text(query: &str, candidate_text: &str, settings: &RankingSettings) -> f64 {
    let query_norm = normalize(query);
    let text_norm = normalize(candidate_text);
    let query_tokens = tokens(&query_norm);
    let text_tokens = tokens(&text_norm);

    let mut score = settings.similarity_weight * jaccard(&query_tokens, &text_tokens);

    if !query_norm.is_empty() && text_norm.contains(&query_norm) {
        score += settings.substring_bonus;
    }

    if !query_tokens.is_empty() && query_tokens.is_subset(&text_tokens) {
        score += settings.all_tokens_bonus;
    }

    if settings.brevity_cap_chars > 0 {
        let cap = settings.brevity_cap_chars;
        let len = text_norm.chars().count().min(cap);
        score += settings.brevity_bonus * (1.0 - len as f64 / cap as f64);
    }

    score
}

/// Filters, scores and ranks candidates against `query`.
///
/// Candidates whose nutrients are all zero are dropped. The result holds at
/// most `settings.max_options` entries; an empty query ranks nothing.
#[must_use]
pub fn rank_candidates(
    query: &str,
    candidates: Vec<Candidate>,
    settings: &RankingSettings,
) -> RankedCandidates {
    if normalize(query).is_empty() {
        return RankedCandidates::default();
    }

    let total = candidates.len();
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|c| !c.nutrients.is_empty())
        .map(|c| {
            let display_name = display_name(&c, query, settings.non_latin_threshold);
            let brand = non_blank(c.brand.as_ref()).map(str::to_string);
            ScoredCandidate {
                score: score_text(query, &candidate_text(&c), settings),
                display_name,
                brand,
                record: c.nutrients,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(settings.max_options);

    tracing::debug!(
        query,
        total,
        kept = scored.len(),
        best = ?scored.first().map(|c| (&c.display_name, c.score)),
        "ranked remote candidates"
    );

    RankedCandidates { options: scored }
}

/// Runs the lookup, turning any failure into an empty list.
pub async fn fetch_candidates(lookup: &dyn FoodLookup, query: &str) -> Vec<Candidate> {
    match lookup.search(query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(query, error = %e, "remote lookup failed, treating as no match");
            Vec::new()
        }
    }
}

/// Looks `query` up remotely and ranks the result.
pub async fn lookup_and_rank(
    lookup: &dyn FoodLookup,
    query: &str,
    settings: &RankingSettings,
) -> RankedCandidates {
    if normalize(query).is_empty() {
        return RankedCandidates::default();
    }
    let candidates = fetch_candidates(lookup, query).await;
    rank_candidates(query, candidates, settings)
}
