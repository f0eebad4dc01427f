//! Shared test utilities for `CalorieQuest`.
//!
//! Helpers for setting up an in-memory database and building entries and
//! dates with sensible defaults.

use crate::core::ledger::{EntrySource, FoodEntry, Meal};
use crate::core::nutrients::Macros;
use crate::errors::Result;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Initializes tracing for tests. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a breakfast entry from the offline lexicon with only calories set.
pub fn sample_entry(name: &str, grams: f64, calories: f64) -> FoodEntry {
    FoodEntry::new(
        Meal::Breakfast,
        name,
        grams,
        Macros::new(calories, 0.0, 0.0, 0.0),
        EntrySource::Offline,
    )
}

/// Shorthand for a calendar date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Asserts two records agree field by field within float noise.
#[allow(clippy::panic)]
pub fn assert_macros_close(actual: &Macros, expected: &Macros) {
    let close = actual
        .as_array()
        .iter()
        .zip(expected.as_array())
        .all(|(a, e)| (a - e).abs() < 1e-9);
    if !close {
        panic!("macros differ: actual {actual:?}, expected {expected:?}");
    }
}
