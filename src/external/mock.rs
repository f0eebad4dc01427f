//! Mock food lookup for testing (no network calls).

use crate::core::remote::{Candidate, FoodLookup};
use crate::errors::{Error, Result};
use async_trait::async_trait;

/// Returns canned candidates, or fails every call.
#[derive(Debug, Clone, Default)]
pub struct MockFoodLookup {
    candidates: Vec<Candidate>,
    fail: bool,
}

impl MockFoodLookup {
    /// Answers every query with `candidates`.
    #[must_use]
    pub const fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            fail: false,
        }
    }

    /// Fails every query as an unreachable service would.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            candidates: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl FoodLookup for MockFoodLookup {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        if self.fail {
            return Err(Error::Remote {
                message: format!("mock lookup failure for {query:?}"),
            });
        }
        Ok(self.candidates.clone())
    }
}
