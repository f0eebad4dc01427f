//! Persisted tracker state.
//!
//! The whole state is one JSON document in the `app_documents` table. Loading
//! is lenient: a missing, corrupt or future-versioned document yields an empty
//! state, and a single malformed day is dropped without losing the others.

use crate::core::aggregate::{AnalyticsView, YearMonth};
use crate::core::ledger::{DayLedger, FoodEntry, Goals};
use crate::core::search::SearchMode;
use crate::core::suggest::MacroPreference;
use crate::entities::{AppDocument, app_document};
use crate::errors::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Key of the state document.
pub const STATE_KEY: &str = "calorie_quest_root_v1";

/// Current document version.
pub const STATE_VERSION: u32 = 1;

/// Last-used view preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiPreferences {
    /// Analytics tab
    pub analytics_tab: AnalyticsView,
    /// Month shown by the calendar tab
    pub selected_month: Option<YearMonth>,
    /// Whether the help panel is expanded
    pub help_open: bool,
    /// Macro to favour in suggestions
    pub prefer: MacroPreference,
    /// Where searches go first
    pub search_mode: SearchMode,
    /// Whether manual entry is active
    pub manual_mode: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            analytics_tab: AnalyticsView::Week,
            selected_month: None,
            help_open: true,
            prefer: MacroPreference::Balanced,
            search_mode: SearchMode::Offline,
            manual_mode: false,
        }
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Document version
    pub version: u32,
    /// Ledgers keyed by local calendar date
    pub days: BTreeMap<NaiveDate, DayLedger>,
    /// View preferences
    pub ui: UiPreferences,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            days: BTreeMap::new(),
            ui: UiPreferences::default(),
        }
    }
}

impl PersistedState {
    /// Ledger for `date`, created with `goals` when absent.
    pub fn ensure_day(&mut self, date: NaiveDate, goals: Goals) -> &mut DayLedger {
        self.days
            .entry(date)
            .or_insert_with(|| DayLedger::with_goals(goals))
    }
}

/// Outcome of reading the state document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedState {
    /// A readable document, defaults filled in
    Valid(PersistedState),
    /// Nothing usable was stored
    Empty,
}

impl LoadedState {
    /// Interprets a raw document body.
    #[must_use]
    pub fn from_document(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "state document is not valid JSON, starting empty");
                return Self::Empty;
            }
        };
        let Value::Object(mut root) = value else {
            warn!("state document is not an object, starting empty");
            return Self::Empty;
        };

        let version = match root.get("version").map(Value::as_u64) {
            None => STATE_VERSION,
            Some(Some(v)) => u32::try_from(v).unwrap_or(u32::MAX),
            Some(None) => 0,
        };
        if version == 0 || version > STATE_VERSION {
            warn!(version, "unsupported state version, starting empty");
            return Self::Empty;
        }

        let days = match root.remove("days") {
            Some(Value::Object(raw_days)) => raw_days
                .into_iter()
                .filter_map(|(key, day)| parse_day(&key, day))
                .collect(),
            _ => BTreeMap::new(),
        };

        let ui = root
            .remove("ui")
            .map(|raw_ui| {
                serde_json::from_value(raw_ui).unwrap_or_else(|e| {
                    warn!(error = %e, "ignoring malformed ui preferences");
                    UiPreferences::default()
                })
            })
            .unwrap_or_default();

        Self::Valid(PersistedState {
            version: STATE_VERSION,
            days,
            ui,
        })
    }

    /// The loaded state, or a fresh one.
    #[must_use]
    pub fn into_state(self) -> PersistedState {
        match self {
            Self::Valid(state) => state,
            Self::Empty => PersistedState::default(),
        }
    }
}

fn parse_day(key: &str, raw: Value) -> Option<(NaiveDate, DayLedger)> {
    let Ok(date) = key.parse::<NaiveDate>() else {
        warn!(key, "dropping day with unreadable date");
        return None;
    };
    let Value::Object(mut day) = raw else {
        warn!(%date, "dropping day that is not an object");
        return None;
    };

    let goals = parse_goals(day.get("goals"));
    let entries = match day.remove("entries") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<FoodEntry>(item) {
                Ok(entry) if entry.has_valid_grams() => Some(entry),
                Ok(entry) => {
                    warn!(%date, name = %entry.name, "dropping entry without valid grams");
                    None
                }
                Err(e) => {
                    warn!(%date, error = %e, "dropping unreadable entry");
                    None
                }
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            warn!(%date, "entries are not a list, keeping goals only");
            Vec::new()
        }
    };

    Some((date, DayLedger { goals, entries }))
}

/// Goals with each readable number taken from `raw`, defaults for the rest.
fn parse_goals(raw: Option<&Value>) -> Goals {
    let mut goals = Goals::default();
    let Some(Value::Object(raw)) = raw else {
        return goals;
    };
    let read = |field: &str| raw.get(field).and_then(Value::as_f64).filter(|v| v.is_finite());
    if let Some(v) = read("calories") {
        goals.calories = v;
    }
    if let Some(v) = read("protein") {
        goals.protein = v;
    }
    if let Some(v) = read("carbs") {
        goals.carbs = v;
    }
    if let Some(v) = read("fat") {
        goals.fat = v;
    }
    goals
}

/// Reads a document body by key.
#[instrument(skip(db))]
pub async fn get_document(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    let row = AppDocument::find()
        .filter(app_document::Column::Key.eq(key))
        .one(db)
        .await?;
    debug!(found = row.is_some(), "read document");
    Ok(row.map(|r| r.value))
}

/// Inserts or replaces a document body by key.
#[instrument(skip(db, value))]
pub async fn set_document(db: &DatabaseConnection, key: &str, value: String) -> Result<()> {
    let now = Utc::now().naive_utc();
    let existing = AppDocument::find()
        .filter(app_document::Column::Key.eq(key))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let mut active: app_document::ActiveModel = row.into();
            active.value = Set(value);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            let active = app_document::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            active.insert(db).await?;
        }
    }
    debug!("wrote document");
    Ok(())
}

/// Loads the state document. Never fails: unreadable storage counts as empty.
pub async fn load_state(db: &DatabaseConnection) -> LoadedState {
    match get_document(db, STATE_KEY).await {
        Ok(Some(raw)) => LoadedState::from_document(&raw),
        Ok(None) => {
            info!("no saved state, starting empty");
            LoadedState::Empty
        }
        Err(e) => {
            warn!(error = %e, "could not read saved state, starting empty");
            LoadedState::Empty
        }
    }
}

/// Writes the whole state document.
pub async fn save_state(db: &DatabaseConnection, state: &PersistedState) -> Result<()> {
    let body = serde_json::to_string(state)?;
    set_document(db, STATE_KEY, body).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::Meal;
    use crate::test_utils::{date, init_test_tracing, sample_entry, setup_test_db};
    use chrono::DateTime;

    fn sample_state() -> PersistedState {
        let mut state = PersistedState::default();
        // stored timestamps keep millisecond precision
        let mut entry = sample_entry("oats", 50.0, 194.5);
        entry.created_at = DateTime::from_timestamp_millis(1_714_550_400_000).unwrap();
        state.ensure_day(date(2024, 5, 1), Goals::default()).add_entry(entry);
        state.ui.analytics_tab = AnalyticsView::Calendar;
        state.ui.selected_month = Some(YearMonth { year: 2024, month: 5 });
        state
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        assert_eq!(load_state(&db).await, LoadedState::Empty);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let state = sample_state();
        save_state(&db, &state).await?;
        assert_eq!(load_state(&db).await, LoadedState::Valid(state));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_single_row() -> Result<()> {
        let db = setup_test_db().await?;
        let mut state = sample_state();
        save_state(&db, &state).await?;
        state.ui.help_open = false;
        save_state(&db, &state).await?;

        let rows = AppDocument::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(load_state(&db).await.into_state(), state);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_document_is_empty() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        set_document(&db, STATE_KEY, "{not json".to_string()).await?;
        assert_eq!(load_state(&db).await, LoadedState::Empty);
        Ok(())
    }

    #[test]
    fn test_future_version_is_empty() {
        assert_eq!(LoadedState::from_document(r#"{"version": 99, "days": {}}"#), LoadedState::Empty);
        assert_eq!(LoadedState::from_document("[1, 2]"), LoadedState::Empty);
    }

    #[test]
    fn test_defaults_filled_in() {
        let state = LoadedState::from_document("{}").into_state();
        assert_eq!(state, PersistedState::default());
        assert!(state.ui.help_open);

        let state = LoadedState::from_document(r#"{"ui": {"searchMode": "openfoodfacts"}}"#).into_state();
        assert_eq!(state.ui.search_mode, SearchMode::OpenFoodFacts);
        assert!(state.ui.help_open);
    }

    #[test]
    fn test_bad_entry_dropped_without_its_day() {
        init_test_tracing();
        let raw = r#"{
            "days": {
                "2024-05-01": {
                    "goals": {"calories": null, "protein": 120},
                    "entries": [
                        {"id": "a", "meal": "Lunch", "name": "rice", "grams": 150, "calories": 195,
                         "source": "offline", "createdAt": 1714550400000},
                        {"id": "b", "meal": "Dinner", "name": "soup", "grams": 300, "calories": null},
                        {"name": "toast", "grams": 40, "calories": 100},
                        {"id": "c", "name": "broken", "grams": "abc"},
                        {"id": "d", "name": "air", "grams": 0}
                    ]
                },
                "2024-05-02": {"goals": {"fat": 60}, "entries": "oops"}
            }
        }"#;
        let state = LoadedState::from_document(raw).into_state();
        assert_eq!(state.days.len(), 2);

        let ledger = &state.days[&date(2024, 5, 1)];
        assert!((ledger.goals.calories - 2200.0).abs() < f64::EPSILON);
        assert!((ledger.goals.protein - 120.0).abs() < f64::EPSILON);
        let names: Vec<&str> = ledger.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["rice", "soup", "toast"]);
        assert!(ledger.entries[1].calories.abs() < f64::EPSILON);
        assert_eq!(ledger.entries[2].meal, Meal::Breakfast);
        assert!(!ledger.entries[2].id.is_empty());

        let other = &state.days[&date(2024, 5, 2)];
        assert!(other.entries.is_empty());
        assert!((other.goals.fat - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_day_dropped_alone() {
        let raw = r#"{
            "days": {
                "2024-05-01": {"goals": {"calories": 1800}, "entries": []},
                "2024-05-02": "oops",
                "yesterday": {}
            },
            "ui": {"analyticsTab": "nonsense"}
        }"#;
        let state = LoadedState::from_document(raw).into_state();
        assert_eq!(state.days.len(), 1);
        let ledger = &state.days[&date(2024, 5, 1)];
        assert!((ledger.goals.calories - 1800.0).abs() < f64::EPSILON);
        assert!((ledger.goals.protein - 150.0).abs() < f64::EPSILON);
        assert_eq!(state.ui, UiPreferences::default());
    }

    #[test]
    fn test_ensure_day_keeps_existing() {
        let mut state = sample_state();
        let ledger = state.ensure_day(date(2024, 5, 1), Goals { calories: 1.0, ..Goals::default() });
        assert_eq!(ledger.entries.len(), 1);
        assert!((ledger.goals.calories - 2200.0).abs() < f64::EPSILON);
    }
}
