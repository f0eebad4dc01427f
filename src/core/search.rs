//! Query to preview: the search flow ahead of logging a food.
//!
//! In remote mode the remote ranker goes first and the offline lexicon is the
//! fallback. In offline mode only the lexicon is consulted. A preview is never
//! persisted; it becomes a ledger entry only once the caller confirms it.

use crate::config::Settings;
use crate::core::ledger::{EntrySource, FoodEntry, Meal};
use crate::core::nutrients::{ServingEstimate, scale};
use crate::core::offline::match_offline_accepted;
use crate::core::remote::{FoodLookup, ScoredCandidate, lookup_and_rank};
use crate::core::text::{normalize, tokens};
use serde::{Deserialize, Serialize};

/// Where searches go first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Offline lexicon only
    #[default]
    Offline,
    /// Open Food Facts, falling back to the lexicon
    #[serde(alias = "openfoodfacts")]
    OpenFoodFacts,
}

/// A resolved, not yet logged, serving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// Name to log
    pub name: String,
    /// Serving size in grams
    pub grams: f64,
    /// Nutrients for the serving
    pub estimate: ServingEstimate,
    /// Origin of the numbers
    pub source: EntrySource,
    /// Short explanation for the user
    pub note: String,
    /// Remote shortlist, best first; empty for offline matches
    pub alternatives: Vec<ScoredCandidate>,
}

impl Preview {
    fn from_remote(grams: f64, candidate: &ScoredCandidate, alternatives: Vec<ScoredCandidate>) -> Self {
        // fallback display names already carry the brand
        let name = match &candidate.brand {
            Some(brand) if !tokens(brand).is_subset(&tokens(&candidate.display_name)) => {
                format!("{} - {brand}", candidate.display_name)
            }
            _ => candidate.display_name.clone(),
        };
        Self {
            name,
            grams,
            estimate: scale(&candidate.record, grams),
            source: EntrySource::Remote,
            note: "Open Food Facts match".to_string(),
            alternatives,
        }
    }

    /// Re-resolves the preview against another shortlist entry.
    #[must_use]
    pub fn with_alternative(&self, index: usize) -> Option<Self> {
        let candidate = self.alternatives.get(index)?;
        Some(Self::from_remote(self.grams, candidate, self.alternatives.clone()))
    }

    /// Turns the preview into a ledger entry for `meal`.
    #[must_use]
    pub fn to_entry(&self, meal: Meal) -> FoodEntry {
        FoodEntry::new(meal, self.name.clone(), self.grams, self.estimate, self.source)
    }
}

/// Resolves `query` at `grams` into a preview, or `None` when nothing matches.
///
/// A blank query or a serving that is not a positive number yields `None`
/// without consulting anything. Remote failures count as "no candidates".
pub async fn search(
    query: &str,
    grams: f64,
    mode: SearchMode,
    lookup: &dyn FoodLookup,
    settings: &Settings,
) -> Option<Preview> {
    if normalize(query).is_empty() || !grams.is_finite() || grams <= 0.0 {
        return None;
    }

    if mode == SearchMode::OpenFoodFacts {
        let ranked = lookup_and_rank(lookup, query, &settings.ranking).await;
        if let Some(best) = ranked.best() {
            tracing::debug!(query, name = %best.display_name, score = best.score, "remote preview");
            return Some(Preview::from_remote(grams, best, ranked.options.clone()));
        }
    }

    let Some(found) = match_offline_accepted(query, settings.matching.offline_threshold) else {
        tracing::debug!(query, ?mode, "no match");
        return None;
    };

    #[allow(clippy::cast_possible_truncation)]
    let percent = (found.score * 100.0).round() as i64;
    Some(Preview {
        name: found.name.to_string(),
        grams,
        estimate: scale(&found.record, grams),
        source: EntrySource::Offline,
        note: format!("Offline match ({percent}%)"),
        alternatives: Vec::new(),
    })
}
