//! Core business logic - framework-agnostic nutrition and analytics engine.
//!
//! Everything here works on plain data. Only [`state`] and [`tracker`] touch
//! the database, and only [`remote`] and [`search`] await the remote lookup.

pub mod aggregate;
pub mod ledger;
pub mod lexicon;
pub mod nutrients;
pub mod offline;
pub mod random;
pub mod remote;
pub mod report;
pub mod search;
pub mod state;
pub mod suggest;
pub mod text;
pub mod tracker;

pub use ledger::{DayLedger, EntrySource, FoodEntry, Goals, Meal};
pub use nutrients::Macros;
pub use tracker::Tracker;
