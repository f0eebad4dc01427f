//! Tracker facade - the single owner of the state and its storage.
//!
//! Reads are computed from the in-memory state. Every mutation writes the whole
//! state document back before returning.

use crate::config::{self, Settings, database};
use crate::core::aggregate::{self, AggregateWindow, YearMonth};
use crate::core::ledger::{DayLedger, FoodEntry, Goals};
use crate::core::nutrients::Macros;
use crate::core::random::{ChoiceSource, RngChoice};
use crate::core::remote::FoodLookup;
use crate::core::report::{self, MacroProgress};
use crate::core::search::{self, Preview};
use crate::core::state::{self, PersistedState, UiPreferences};
use crate::core::suggest::{self, MealPlan, Suggestion};
use crate::errors::Result;
use crate::external::OpenFoodFactsClient;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::borrow::Cow;
use tracing::{info, instrument};

/// Owns the persisted state, its database and the remote lookup.
pub struct Tracker {
    db: DatabaseConnection,
    settings: Settings,
    lookup: Box<dyn FoodLookup>,
    state: PersistedState,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("settings", &self.settings)
            .field("days", &self.state.days.len())
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Loads the saved state from `db`. A corrupt or missing document starts
    /// an empty tracker.
    pub async fn open(
        db: DatabaseConnection,
        settings: Settings,
        lookup: Box<dyn FoodLookup>,
    ) -> Self {
        let state = state::load_state(&db).await.into_state();
        info!(days = state.days.len(), "tracker opened");
        Self {
            db,
            settings,
            lookup,
            state,
        }
    }

    /// Opens the tracker from `config.toml`, `DATABASE_URL` and the public
    /// Open Food Facts instance.
    pub async fn open_default() -> Result<Self> {
        let settings = config::load_default_config()?;
        let db = database::create_connection().await?;
        let lookup = OpenFoodFactsClient::new(settings.remote.clone())?;
        Ok(Self::open(db, settings, Box::new(lookup)).await)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ledger for `date`, created with the configured default goals if absent.
    pub fn ledger(&mut self, date: NaiveDate) -> &DayLedger {
        self.state.ensure_day(date, self.settings.goals)
    }

    fn day(&self, date: NaiveDate) -> Cow<'_, DayLedger> {
        self.state.days.get(&date).map_or_else(
            || Cow::Owned(DayLedger::with_goals(self.settings.goals)),
            Cow::Borrowed,
        )
    }

    async fn persist(&self) -> Result<()> {
        state::save_state(&self.db, &self.state).await
    }

    /// Resolves a query using the saved search mode.
    pub async fn search(&self, query: &str, grams: f64) -> Option<Preview> {
        search::search(
            query,
            grams,
            self.state.ui.search_mode,
            self.lookup.as_ref(),
            &self.settings,
        )
        .await
    }

    /// Logs `entry` on `date`. Returns `false`, without saving, when the entry
    /// has no valid serving size.
    #[instrument(skip(self, entry), fields(name = %entry.name))]
    pub async fn add_entry(&mut self, date: NaiveDate, entry: FoodEntry) -> Result<bool> {
        let added = self
            .state
            .ensure_day(date, self.settings.goals)
            .add_entry(entry);
        if added {
            self.persist().await?;
        }
        Ok(added)
    }

    /// Removes the entry `id` from `date`. Unknown ids change nothing.
    #[instrument(skip(self))]
    pub async fn remove_entry(&mut self, date: NaiveDate, id: &str) -> Result<Option<FoodEntry>> {
        let removed = self
            .state
            .days
            .get_mut(&date)
            .and_then(|ledger| ledger.remove_entry(id));
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Clears the entries of `date`, keeping its goals.
    #[instrument(skip(self))]
    pub async fn reset_day(&mut self, date: NaiveDate) -> Result<()> {
        self.state
            .ensure_day(date, self.settings.goals)
            .clear_entries();
        self.persist().await
    }

    /// Replaces the goals of `date`.
    #[instrument(skip(self))]
    pub async fn set_goals(&mut self, date: NaiveDate, goals: Goals) -> Result<()> {
        self.state
            .ensure_day(date, self.settings.goals)
            .set_goals(goals);
        self.persist().await
    }

    /// Replaces the view preferences.
    pub async fn set_preferences(&mut self, ui: UiPreferences) -> Result<()> {
        self.state.ui = ui;
        self.persist().await
    }

    /// Totals logged on `date`.
    #[must_use]
    pub fn totals(&self, date: NaiveDate) -> Macros {
        self.day(date).totals()
    }

    /// Goals minus totals on `date`, unclamped.
    #[must_use]
    pub fn remaining(&self, date: NaiveDate) -> Macros {
        self.day(date).remaining()
    }

    /// Per-macro progress on `date`.
    #[must_use]
    pub fn progress(&self, date: NaiveDate) -> Vec<MacroProgress> {
        report::day_progress(&self.day(date))
    }

    /// Aggregates the given dates.
    #[must_use]
    pub fn summarize(&self, dates: &[NaiveDate]) -> AggregateWindow {
        aggregate::summarize(&self.state.days, dates)
    }

    /// Aggregates the saved analytics tab as of `today`.
    #[must_use]
    pub fn analytics(&self, today: NaiveDate) -> AggregateWindow {
        let ui = &self.state.ui;
        let dates = aggregate::window_dates(ui.analytics_tab, today, ui.selected_month, &self.state.days);
        self.summarize(&dates)
    }

    /// Months with stored data, oldest first.
    #[must_use]
    pub fn available_months(&self) -> Vec<YearMonth> {
        aggregate::available_months(&self.state.days)
    }

    /// What to eat next on `date`, by the saved macro preference.
    #[must_use]
    pub fn suggestions(&self, date: NaiveDate) -> Vec<Suggestion> {
        suggest::suggest(
            &self.remaining(date),
            self.state.ui.prefer,
            &self.settings.suggestions,
        )
    }

    /// A random day plan for the goals of `date`.
    #[must_use]
    pub fn meal_plan(&self, date: NaiveDate) -> MealPlan {
        self.meal_plan_with(date, &mut RngChoice::thread())
    }

    /// [`Tracker::meal_plan`] with an explicit pick source.
    #[must_use]
    pub fn meal_plan_with<C: ChoiceSource + ?Sized>(&self, date: NaiveDate, source: &mut C) -> MealPlan {
        suggest::generate_meal_plan_with(&self.day(date).goals, source)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::aggregate::AnalyticsView;
    use crate::core::ledger::{EntrySource, Meal};
    use crate::core::random::SequenceChoice;
    use crate::core::remote::Candidate;
    use crate::core::search::SearchMode;
    use crate::external::MockFoodLookup;
    use crate::test_utils::{date, init_test_tracing, sample_entry, setup_test_db};

    async fn open_tracker(db: &DatabaseConnection) -> Tracker {
        Tracker::open(db.clone(), Settings::default(), Box::new(MockFoodLookup::failing())).await
    }

    #[tokio::test]
    async fn test_open_empty_database() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let mut tracker = open_tracker(&db).await;
        assert!(tracker.state().days.is_empty());

        let today = date(2024, 6, 1);
        assert_eq!(tracker.ledger(today).goals, Goals::default());
        assert_eq!(tracker.remaining(today).calories, 2200.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let today = date(2024, 6, 1);

        let mut tracker = open_tracker(&db).await;
        let entry = sample_entry("banana", 120.0, 106.8);
        let id = entry.id.clone();
        assert!(tracker.add_entry(today, entry).await?);
        tracker.add_entry(today, sample_entry("oats", 50.0, 194.5)).await?;
        tracker
            .set_goals(today, Goals { calories: 1800.0, ..Goals::default() })
            .await?;
        tracker
            .set_preferences(UiPreferences {
                search_mode: SearchMode::OpenFoodFacts,
                ..UiPreferences::default()
            })
            .await?;
        assert!(tracker.remove_entry(today, &id).await?.is_some());

        let reopened = open_tracker(&db).await;
        assert_eq!(reopened.totals(today).calories, 194.5);
        assert_eq!(reopened.remaining(today).calories, 1800.0 - 194.5);
        assert_eq!(reopened.state().ui.search_mode, SearchMode::OpenFoodFacts);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_entry_not_logged() -> Result<()> {
        let db = setup_test_db().await?;
        let mut tracker = open_tracker(&db).await;
        let today = date(2024, 6, 1);
        assert!(!tracker.add_entry(today, sample_entry("air", 0.0, 10.0)).await?);
        assert_eq!(tracker.totals(today), Macros::ZERO);
        assert!(tracker.remove_entry(today, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_day_keeps_goals() -> Result<()> {
        let db = setup_test_db().await?;
        let mut tracker = open_tracker(&db).await;
        let today = date(2024, 6, 1);
        let goals = Goals { protein: 180.0, ..Goals::default() };
        tracker.set_goals(today, goals).await?;
        tracker.add_entry(today, sample_entry("egg", 100.0, 143.0)).await?;
        tracker.reset_day(today).await?;

        let reopened = open_tracker(&db).await;
        assert_eq!(reopened.totals(today), Macros::ZERO);
        assert_eq!(reopened.state().days[&today].goals, goals);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_then_log() -> Result<()> {
        let db = setup_test_db().await?;
        let lookup = MockFoodLookup::with_candidates(vec![Candidate {
            name: Some("Oat drink".to_string()),
            name_en: None,
            brand: None,
            nutrients: Macros::new(46.0, 1.0, 6.7, 1.5),
        }]);
        let mut tracker = Tracker::open(db, Settings::default(), Box::new(lookup)).await;
        let today = date(2024, 6, 1);

        // offline by default
        let preview = tracker.search("oats", 40.0).await.unwrap();
        assert_eq!(preview.source, EntrySource::Offline);

        let mut ui = tracker.state().ui.clone();
        ui.search_mode = SearchMode::OpenFoodFacts;
        tracker.set_preferences(ui).await?;
        let preview = tracker.search("oat drink", 250.0).await.unwrap();
        assert_eq!(preview.source, EntrySource::Remote);

        tracker.add_entry(today, preview.to_entry(Meal::Breakfast)).await?;
        assert_eq!(tracker.totals(today).calories, 115.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_analytics_and_suggestions() -> Result<()> {
        let db = setup_test_db().await?;
        let mut tracker = open_tracker(&db).await;
        tracker.add_entry(date(2024, 5, 30), sample_entry("rice", 200.0, 700.0)).await?;
        tracker.add_entry(date(2024, 6, 1), sample_entry("rice", 200.0, 700.0)).await?;

        let week = tracker.analytics(date(2024, 6, 1));
        assert_eq!(week.per_day.len(), 7);
        assert_eq!(week.sum.calories, 1400.0);
        assert_eq!(week.avg.calories, 200.0);

        let mut ui = tracker.state().ui.clone();
        ui.analytics_tab = AnalyticsView::Calendar;
        tracker.set_preferences(ui).await?;
        let june = tracker.analytics(date(2024, 6, 15));
        assert_eq!(june.per_day.len(), 30);
        assert_eq!(june.sum.calories, 700.0);
        assert_eq!(tracker.available_months().len(), 2);

        assert_eq!(tracker.suggestions(date(2024, 6, 1)).len(), 8);
        assert_eq!(tracker.progress(date(2024, 6, 1)).len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_meal_plan_uses_day_goals() -> Result<()> {
        let db = setup_test_db().await?;
        let mut tracker = open_tracker(&db).await;
        let today = date(2024, 6, 1);
        tracker
            .set_goals(today, Goals { calories: 1600.0, ..Goals::default() })
            .await?;
        let plan = tracker.meal_plan_with(today, &mut SequenceChoice::new(vec![0]));
        assert_eq!(plan.slots.len(), 4);
        assert_eq!(plan.slots[0].target_calories, 1600.0 * 0.25);
        assert_eq!(tracker.meal_plan(today).slots.len(), 4);
        Ok(())
    }
}
