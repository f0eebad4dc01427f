//! Day ledger - the entries and goals for one calendar date.
//!
//! Entries are kept newest-first. A ledger never clamps anything: remaining
//! macros may be negative, and each consumer decides how to clamp them.

use crate::core::nutrients::{Macros, NutrientRecord, ServingEstimate, scale};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Meal slot an entry is logged against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Meal {
    /// Morning meal
    #[default]
    Breakfast,
    /// Midday meal
    Lunch,
    /// Between meals
    Snack,
    /// Evening meal
    Dinner,
    /// Any other user-supplied label
    Other(String),
}

impl Meal {
    /// The four standard slots, in day order.
    pub const STANDARD: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Snack, Self::Dinner];

    /// Label as shown and stored.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Snack => "Snack",
            Self::Dinner => "Dinner",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Meal {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "breakfast" | "" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "snack" => Self::Snack,
            "dinner" => Self::Dinner,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<Meal> for String {
    fn from(value: Meal) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an entry's nutrient numbers came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Offline lexicon
    Offline,
    /// Remote food database
    #[serde(alias = "openfoodfacts")]
    Remote,
    /// Typed in by the user
    #[default]
    Manual,
}

/// A confirmed, logged food.
///
/// Reading is lenient: null or missing numbers read as 0, a missing meal
/// as Breakfast, and a missing id or timestamp is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    /// Globally unique, stable for the lifetime of the entry
    #[serde(default = "new_entry_id", deserialize_with = "lenient_id")]
    pub id: String,
    /// Meal slot
    #[serde(default, deserialize_with = "lenient_meal")]
    pub meal: Meal,
    /// Food name
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub name: String,
    /// Serving size in grams
    #[serde(default, deserialize_with = "lenient_number")]
    pub grams: f64,
    /// kcal for the serving
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: f64,
    /// Protein grams for the serving
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: f64,
    /// Carbohydrate grams for the serving
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: f64,
    /// Fat grams for the serving
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat: f64,
    /// Origin of the numbers
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub source: EntrySource,
    /// When the entry was logged
    #[serde(
        default = "Utc::now",
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_meal<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Meal, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Meal::from)
        .unwrap_or_default())
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => new_entry_id(),
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now))
}

impl FoodEntry {
    /// Builds an entry from a per-serving estimate.
    #[must_use]
    pub fn new(
        meal: Meal,
        name: impl Into<String>,
        grams: f64,
        estimate: ServingEstimate,
        source: EntrySource,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meal,
            name: name.into(),
            grams,
            calories: estimate.calories,
            protein: estimate.protein,
            carbs: estimate.carbs,
            fat: estimate.fat,
            source,
            created_at: Utc::now(),
        }
    }

    /// Builds an entry by scaling a per-100 g record to `grams`.
    #[must_use]
    pub fn from_record(
        meal: Meal,
        name: impl Into<String>,
        grams: f64,
        record: &NutrientRecord,
        source: EntrySource,
    ) -> Self {
        Self::new(meal, name, grams, scale(record, grams), source)
    }

    /// Builds a manual entry; a blank name becomes "Manual item".
    #[must_use]
    pub fn manual(meal: Meal, name: &str, grams: f64, nutrients: Macros) -> Self {
        let name = match name.trim() {
            "" => "Manual item",
            trimmed => trimmed,
        };
        Self::new(
            meal,
            name,
            grams,
            Macros::from_optional(
                Some(nutrients.calories),
                Some(nutrients.protein),
                Some(nutrients.carbs),
                Some(nutrients.fat),
            ),
            EntrySource::Manual,
        )
    }

    /// Nutrients of this entry.
    #[must_use]
    pub const fn nutrients(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fat)
    }

    /// Whether the serving size is loggable.
    #[must_use]
    pub fn has_valid_grams(&self) -> bool {
        self.grams.is_finite() && self.grams > 0.0
    }
}

/// Daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    /// kcal target
    pub calories: f64,
    /// Protein grams target
    pub protein: f64,
    /// Carbohydrate grams target
    pub carbs: f64,
    /// Fat grams target
    pub fat: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: 2200.0,
            protein: 150.0,
            carbs: 250.0,
            fat: 70.0,
        }
    }
}

impl Goals {
    /// Goals as a macro record.
    #[must_use]
    pub const fn as_macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fat)
    }
}

/// Entries and goals for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayLedger {
    /// Active goals
    pub goals: Goals,
    /// Logged entries, newest first
    pub entries: Vec<FoodEntry>,
}

impl DayLedger {
    /// Empty ledger with the given goals.
    #[must_use]
    pub const fn with_goals(goals: Goals) -> Self {
        Self {
            goals,
            entries: Vec::new(),
        }
    }

    /// Inserts `entry` at the front. Entries without positive, finite grams are
    /// ignored. Returns whether the entry was added.
    pub fn add_entry(&mut self, entry: FoodEntry) -> bool {
        if !entry.has_valid_grams() {
            tracing::debug!(grams = entry.grams, name = %entry.name, "ignoring entry without valid grams");
            return false;
        }
        self.entries.insert(0, entry);
        true
    }

    /// Removes the entry with `id`, returning it if it was present.
    pub fn remove_entry(&mut self, id: &str) -> Option<FoodEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(position))
    }

    /// Removes all entries, keeping the goals.
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    /// Replaces the goal set wholesale.
    pub fn set_goals(&mut self, goals: Goals) {
        self.goals = goals;
    }

    /// Field-wise sum over all entries.
    #[must_use]
    pub fn totals(&self) -> Macros {
        totals(&self.entries)
    }

    /// Goals minus totals, unclamped.
    #[must_use]
    pub fn remaining(&self) -> Macros {
        remaining(&self.goals, &self.totals())
    }

    /// Entries logged against `meal`, newest first.
    pub fn entries_for<'a>(&'a self, meal: &'a Meal) -> impl Iterator<Item = &'a FoodEntry> + 'a {
        self.entries.iter().filter(move |e| &e.meal == meal)
    }
}

/// Field-wise sum over `entries`; empty input is all-zero.
#[must_use]
pub fn totals(entries: &[FoodEntry]) -> Macros {
    entries.iter().map(FoodEntry::nutrients).sum()
}

/// `goal - total` for each field. May be negative.
#[must_use]
pub fn remaining(goals: &Goals, totals: &Macros) -> Macros {
    goals.as_macros().minus(*totals)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::sample_entry;

    #[test]
    fn test_empty_ledger_totals_are_zero() {
        let ledger = DayLedger::with_goals(Goals {
            calories: 2200.0,
            ..Goals::default()
        });
        assert_eq!(ledger.totals(), Macros::ZERO);
        assert_eq!(ledger.remaining().calories, 2200.0);
    }

    #[test]
    fn test_add_entry_inserts_newest_first() {
        let mut ledger = DayLedger::default();
        let first = sample_entry("banana", 120.0, 107.0);
        let second = sample_entry("oats", 50.0, 194.5);
        assert!(ledger.add_entry(first.clone()));
        assert!(ledger.add_entry(second.clone()));

        assert_eq!(ledger.entries[0].id, second.id);
        assert_eq!(ledger.entries[1].id, first.id);
        assert_eq!(ledger.totals().calories, 301.5);
    }

    #[test]
    fn test_add_entry_rejects_non_positive_grams() {
        let mut ledger = DayLedger::default();
        assert!(!ledger.add_entry(sample_entry("air", 0.0, 0.0)));
        assert!(!ledger.add_entry(sample_entry("anti-food", -10.0, 50.0)));
        assert!(!ledger.add_entry(sample_entry("nan", f64::NAN, 50.0)));
        assert!(ledger.entries.is_empty());
    }

    #[test]
    fn test_add_then_remove_restores_ledger() {
        let mut ledger = DayLedger::default();
        ledger.add_entry(sample_entry("apple", 150.0, 78.0));
        let before = ledger.clone();
        let before_totals = ledger.totals();

        let entry = sample_entry("salmon", 120.0, 249.6);
        let id = entry.id.clone();
        ledger.add_entry(entry);
        assert_ne!(ledger, before);

        let removed = ledger.remove_entry(&id);
        assert_eq!(removed.map(|e| e.id), Some(id));
        assert_eq!(ledger, before);
        assert_eq!(ledger.totals(), before_totals);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut ledger = DayLedger::default();
        ledger.add_entry(sample_entry("apple", 150.0, 78.0));
        let before = ledger.clone();
        assert!(ledger.remove_entry("no-such-id").is_none());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let mut ledger = DayLedger::with_goals(Goals {
            calories: 100.0,
            protein: 10.0,
            carbs: 10.0,
            fat: 10.0,
        });
        ledger.add_entry(sample_entry("olive oil", 20.0, 176.8));
        assert_eq!(ledger.remaining().calories, 100.0 - 176.8);
    }

    #[test]
    fn test_set_goals_and_clear_entries() {
        let mut ledger = DayLedger::default();
        ledger.add_entry(sample_entry("egg", 50.0, 71.5));
        let goals = Goals {
            calories: 1800.0,
            protein: 140.0,
            carbs: 180.0,
            fat: 60.0,
        };
        ledger.set_goals(goals);
        ledger.clear_entries();
        assert_eq!(ledger.goals, goals);
        assert!(ledger.entries.is_empty());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = sample_entry("egg", 50.0, 71.5);
        let b = sample_entry("egg", 50.0, 71.5);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_record_scales_to_grams() {
        let banana = Macros::new(89.0, 1.1, 22.8, 0.3);
        let entry = FoodEntry::from_record(Meal::Snack, "banana", 200.0, &banana, EntrySource::Offline);
        assert_eq!(entry.calories, 178.0);
        assert_eq!(entry.source, EntrySource::Offline);
    }

    #[test]
    fn test_manual_entry_defaults_name() {
        let entry = FoodEntry::manual(Meal::Lunch, "   ", 100.0, Macros::new(300.0, 20.0, 30.0, -5.0));
        assert_eq!(entry.name, "Manual item");
        assert_eq!(entry.source, EntrySource::Manual);
        assert_eq!(entry.fat, 0.0);
    }

    #[test]
    fn test_meal_labels_round_trip_through_strings() {
        assert_eq!(Meal::from("dinner".to_string()), Meal::Dinner);
        assert_eq!(Meal::from("Second breakfast".to_string()), Meal::Other("Second breakfast".into()));
        assert_eq!(String::from(Meal::Snack), "Snack");

        let entry = sample_entry("apple", 100.0, 52.0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["meal"], "Breakfast");
        assert_eq!(json["source"], "offline");
        assert!(json["createdAt"].is_i64());
    }

    #[test]
    fn test_stored_entry_read_leniently() {
        let entry: FoodEntry = serde_json::from_value(serde_json::json!({
            "name": "toast",
            "grams": 40,
            "calories": null,
            "protein": 3.5
        }))
        .unwrap();
        assert_eq!(entry.meal, Meal::Breakfast);
        assert_eq!(entry.calories, 0.0);
        assert_eq!(entry.protein, 3.5);
        assert_eq!(entry.source, EntrySource::Manual);
        assert!(!entry.id.is_empty());

        let entry: FoodEntry = serde_json::from_value(serde_json::json!({
            "id": 7,
            "meal": null,
            "name": null,
            "grams": 10,
            "createdAt": 1_714_550_400_000_i64
        }))
        .unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(entry.meal, Meal::Breakfast);
        assert_eq!(entry.name, "");
        assert_eq!(entry.created_at.timestamp_millis(), 1_714_550_400_000);

        let unreadable = serde_json::from_value::<FoodEntry>(serde_json::json!({"grams": "abc"}));
        assert!(unreadable.is_err());
    }

    #[test]
    fn test_entries_for_meal() {
        let mut ledger = DayLedger::default();
        ledger.add_entry(sample_entry("apple", 100.0, 52.0));
        ledger.add_entry(FoodEntry::manual(Meal::Dinner, "soup", 300.0, Macros::new(150.0, 5.0, 20.0, 4.0)));
        assert_eq!(ledger.entries_for(&Meal::Dinner).count(), 1);
        assert_eq!(ledger.entries_for(&Meal::Breakfast).count(), 1);
    }
}
