//! Offline lexicon matching.
//!
//! Maps a free-text query onto the closest entry of the fixed lexicon by token
//! set similarity. The scan is linear over the table; ties keep the entry that
//! comes first in table order.

use crate::core::lexicon::{LEXICON, LexiconEntry};
use crate::core::nutrients::NutrientRecord;
use crate::core::text::{jaccard, tokens};

/// Best lexicon entry for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfflineMatch {
    /// Lexicon name that matched
    pub name: &'static str,
    /// Nutrients per 100 g
    pub record: NutrientRecord,
    /// Jaccard similarity in `(0, 1]`
    pub score: f64,
}

impl OfflineMatch {
    /// Whether the score clears the caller's acceptance threshold.
    #[must_use]
    pub fn is_accepted(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

/// Finds the best-scoring lexicon entry for `query`.
///
/// Returns `None` for an empty query or when nothing shares a token with it.
#[must_use]
pub fn match_offline(query: &str) -> Option<OfflineMatch> {
    match_in(LEXICON, query)
}

/// [`match_offline`], keeping the result only when it clears `threshold`.
#[must_use]
pub fn match_offline_accepted(query: &str, threshold: f64) -> Option<OfflineMatch> {
    match_offline(query).filter(|m| m.is_accepted(threshold))
}

pub(crate) fn match_in(table: &'static [LexiconEntry], query: &str) -> Option<OfflineMatch> {
    let query_tokens = tokens(query);
    if query_tokens.is_empty() {
        return None;
    }

    let mut best: Option<OfflineMatch> = None;
    for entry in table {
        let score = jaccard(&query_tokens, &tokens(entry.name));
        let current = best.map_or(0.0, |b| b.score);
        if score > current {
            best = Some(OfflineMatch {
                name: entry.name,
                record: entry.record,
                score,
            });
        }
    }

    tracing::debug!(query, best = ?best.map(|b| (b.name, b.score)), "offline match");
    best
}
