//! Injectable randomness.
//!
//! Meal-plan food picks and motivation messages are random. Everything that
//! picks goes through [`ChoiceSource`] so tests can swap in a fixed sequence.

use rand::Rng;
use rand::rngs::ThreadRng;

/// Picks an index out of `len` options.
pub trait ChoiceSource {
    /// Returns an index in `0..len`. Only called with `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// [`ChoiceSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngChoice<R: Rng>(pub R);

impl RngChoice<ThreadRng> {
    /// Uses the thread-local generator.
    #[must_use]
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl<R: Rng> ChoiceSource for RngChoice<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Replays a fixed list of indices, cycling when exhausted. Indices are taken
/// modulo `len`.
#[derive(Debug, Clone)]
pub struct SequenceChoice {
    picks: Vec<usize>,
    cursor: usize,
}

impl SequenceChoice {
    /// Builds a sequence; an empty list always picks index 0.
    #[must_use]
    pub const fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }
}

impl ChoiceSource for SequenceChoice {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick % len
    }
}

/// Picks one element of `items`, or `None` when it is empty.
pub fn choose<'a, T, C: ChoiceSource + ?Sized>(items: &'a [T], source: &mut C) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(source.pick_index(items.len()))
}
