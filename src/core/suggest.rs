//! "What to eat next" suggestions and full-day meal plans.
//!
//! Suggestions score every lexicon food by how much of the remaining macro
//! budget it fills without overshooting. Meal plans split the calorie goal
//! across the four standard slots and fill each slot with one food per
//! category, scaled toward the slot's calorie target.

use crate::config::settings::SuggestionSettings;
use crate::core::ledger::{Goals, Meal};
use crate::core::lexicon::{
    self, CARB_FOODS, FAT_FOODS, LEXICON, LexiconEntry, PROTEIN_FOODS, VEGETABLE_FOODS,
};
use crate::core::nutrients::{Macros, NutrientRecord, scale};
use crate::core::random::{ChoiceSource, RngChoice, choose};
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-6;

/// Which macro the user wants to prioritise when asking for suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroPreference {
    /// Even spread
    #[default]
    Balanced,
    /// Favour protein
    Protein,
    /// Favour carbohydrates
    Carbs,
    /// Favour fat
    Fat,
}

impl MacroPreference {
    /// Weights in `[calories, protein, carbs, fat]` order.
    #[must_use]
    pub const fn weights(self) -> [f64; 4] {
        match self {
            Self::Balanced => [0.15, 0.30, 0.30, 0.25],
            Self::Protein => [0.10, 0.60, 0.15, 0.15],
            Self::Carbs => [0.10, 0.15, 0.60, 0.15],
            Self::Fat => [0.10, 0.15, 0.15, 0.60],
        }
    }
}

/// One ranked lexicon food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestion {
    /// Lexicon name
    pub name: &'static str,
    /// Nutrients per 100 g
    pub record: NutrientRecord,
    /// Fit score, higher is better
    pub score: f64,
}

fn fit_score(
    food: &NutrientRecord,
    budget: &Macros,
    weights: [f64; 4],
    settings: &SuggestionSettings,
) -> f64 {
    let mut score: f64 = food
        .as_array()
        .iter()
        .zip(budget.as_array())
        .zip(weights)
        .map(|((&have, left), weight)| weight * (have.min(left) / (left + EPSILON)))
        .sum();

    if budget.calories > 0.0 && food.calories > budget.calories * settings.overshoot_ratio {
        score *= settings.overshoot_penalty;
    }
    score
}

/// Ranks lexicon foods against the remaining macros.
///
/// `remaining` is clamped to `max(0, x)` per field here, so an overshot macro
/// simply stops contributing. Ties keep lexicon order.
#[must_use]
pub fn suggest(
    remaining: &Macros,
    preference: MacroPreference,
    settings: &SuggestionSettings,
) -> Vec<Suggestion> {
    let budget = remaining.clamp_non_negative();
    let weights = preference.weights();

    let mut scored: Vec<Suggestion> = LEXICON
        .iter()
        .map(|entry| Suggestion {
            name: entry.name,
            record: entry.record,
            score: fit_score(&entry.record, &budget, weights, settings),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(settings.limit);
    scored
}

/// Share of the daily calorie goal per slot.
pub const MEAL_SPLITS: [(Meal, f64); 4] = [
    (Meal::Breakfast, 0.25),
    (Meal::Lunch, 0.30),
    (Meal::Snack, 0.15),
    (Meal::Dinner, 0.30),
];

const PROTEIN_GRAMS: f64 = 150.0;
const CARB_GRAMS: f64 = 150.0;
const VEGETABLE_GRAMS: f64 = 120.0;
const FAT_GRAMS: f64 = 20.0;

/// Bounds on how far a slot's nominal servings may be scaled.
pub const MIN_SCALE_FACTOR: f64 = 0.6;
/// Upper bound, see [`MIN_SCALE_FACTOR`].
pub const MAX_SCALE_FACTOR: f64 = 1.6;

/// A food and its planned serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlannedItem {
    /// Lexicon name
    pub food: &'static str,
    /// Serving in whole grams
    pub grams: f64,
}

impl PlannedItem {
    /// Nutrients of this serving.
    #[must_use]
    pub fn nutrients(&self) -> Macros {
        lexicon::lookup(self.food).map_or(Macros::ZERO, |e| scale(&e.record, self.grams))
    }
}

/// One meal slot of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotPlan {
    /// Slot
    pub meal: Meal,
    /// Calorie target for the slot
    pub target_calories: f64,
    /// Clamped scale factor applied to the nominal servings
    pub factor: f64,
    /// Planned foods
    pub items: Vec<PlannedItem>,
}

impl SlotPlan {
    /// Nutrients of all items in the slot.
    #[must_use]
    pub fn totals(&self) -> Macros {
        self.items.iter().map(PlannedItem::nutrients).sum()
    }
}

/// A full day, slots in day order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    /// Breakfast, lunch, snack, dinner
    pub slots: Vec<SlotPlan>,
}

impl MealPlan {
    /// Plan for one slot.
    #[must_use]
    pub fn slot(&self, meal: &Meal) -> Option<&SlotPlan> {
        self.slots.iter().find(|s| &s.meal == meal)
    }

    /// Nutrients of the whole plan.
    #[must_use]
    pub fn totals(&self) -> Macros {
        self.slots.iter().map(SlotPlan::totals).sum()
    }
}

fn pick_item<C: ChoiceSource + ?Sized>(
    names: &[&str],
    grams: f64,
    source: &mut C,
) -> Option<(&'static LexiconEntry, f64)> {
    let foods = lexicon::resolve_category(names);
    choose(&foods, source).map(|&entry| (entry, grams))
}

fn plan_slot<C: ChoiceSource + ?Sized>(meal: Meal, target: f64, source: &mut C) -> SlotPlan {
    let mut picks = vec![
        pick_item(PROTEIN_FOODS, PROTEIN_GRAMS, source),
        pick_item(CARB_FOODS, CARB_GRAMS, source),
        pick_item(VEGETABLE_FOODS, VEGETABLE_GRAMS, source),
    ];
    if matches!(meal, Meal::Lunch | Meal::Dinner) {
        picks.push(pick_item(FAT_FOODS, FAT_GRAMS, source));
    }
    let picks: Vec<(&LexiconEntry, f64)> = picks.into_iter().flatten().collect();

    let baseline: f64 = picks
        .iter()
        .map(|(entry, grams)| scale(&entry.record, *grams).calories)
        .sum();
    let raw = if baseline > 0.0 { target / baseline } else { 1.0 };
    let factor = if raw.is_finite() {
        raw.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
    } else {
        1.0
    };

    let items = picks
        .into_iter()
        .map(|(entry, grams)| PlannedItem {
            food: entry.name,
            grams: (grams * factor).round(),
        })
        .collect();

    SlotPlan {
        meal,
        target_calories: target,
        factor,
        items,
    }
}

/// Builds a day plan for `goals`, drawing food picks from `source`.
pub fn generate_meal_plan_with<C: ChoiceSource + ?Sized>(
    goals: &Goals,
    source: &mut C,
) -> MealPlan {
    let slots = MEAL_SPLITS
        .into_iter()
        .map(|(meal, fraction)| plan_slot(meal, goals.calories * fraction, source))
        .collect();
    let plan = MealPlan { slots };
    tracing::debug!(
        calories = goals.calories,
        planned = plan.totals().calories,
        "generated meal plan"
    );
    plan
}

/// Builds a day plan for `goals` using the thread-local random generator.
#[must_use]
pub fn generate_meal_plan(goals: &Goals) -> MealPlan {
    generate_meal_plan_with(goals, &mut RngChoice::thread())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::random::SequenceChoice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn goals(calories: f64) -> Goals {
        Goals {
            calories,
            ..Goals::default()
        }
    }

    #[test]
    fn test_suggest_returns_top_eight_sorted() {
        let list = suggest(
            &Goals::default().as_macros(),
            MacroPreference::Balanced,
            &SuggestionSettings::default(),
        );
        assert_eq!(list.len(), 8);
        assert!(list.windows(2).all(|w| w[0].score >= w[1].score));
        // a full day's budget is best filled by the densest fat source
        assert_eq!(list[0].name, "olive oil");
    }

    #[test]
    fn test_suggest_penalizes_overshooting_foods() {
        let remaining = Macros::new(100.0, 30.0, 0.0, 0.0);
        let list = suggest(&remaining, MacroPreference::Balanced, &SuggestionSettings::default());
        assert_eq!(list[0].name, "tuna (canned in water)");

        let chicken = list.iter().find(|s| s.name == "chicken breast").unwrap();
        // 0.15 * 1 + 0.30 * 1, then x0.6 for 165 kcal > 1.5 x 100
        assert!((chicken.score - 0.45 * 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_suggest_clamps_negative_remaining() {
        let over = Macros::new(-500.0, -20.0, -10.0, -5.0);
        let list = suggest(&over, MacroPreference::Balanced, &SuggestionSettings::default());
        assert!(list.iter().all(|s| s.score == 0.0));
        // stable sort: table order survives when every score ties
        assert_eq!(list[0].name, LEXICON[0].name);
    }

    #[test]
    fn test_preference_shifts_ranking() {
        let remaining = Goals::default().as_macros();
        let settings = SuggestionSettings::default();
        let carbs = suggest(&remaining, MacroPreference::Carbs, &settings);
        assert_eq!(carbs[0].name, "oats");
        assert!(!carbs.iter().any(|s| s.name == "chicken breast"));

        let protein = suggest(&remaining, MacroPreference::Protein, &settings);
        assert!(protein.iter().any(|s| s.name == "chicken breast"));
    }

    #[test]
    fn test_suggest_respects_limit() {
        let settings = SuggestionSettings {
            limit: 3,
            ..SuggestionSettings::default()
        };
        let list = suggest(&Goals::default().as_macros(), MacroPreference::Fat, &settings);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].name, "olive oil");
    }

    #[test]
    fn test_meal_plan_with_fixed_picks() {
        let mut source = SequenceChoice::new(vec![0]);
        let plan = generate_meal_plan_with(&goals(2000.0), &mut source);

        assert_eq!(plan.slots.len(), 4);
        let meals: Vec<&Meal> = plan.slots.iter().map(|s| &s.meal).collect();
        assert_eq!(meals, vec![&Meal::Breakfast, &Meal::Lunch, &Meal::Snack, &Meal::Dinner]);

        let breakfast = plan.slot(&Meal::Breakfast).unwrap();
        assert_eq!(breakfast.target_calories, 500.0);
        // 871.8 kcal baseline, 500 / 871.8 clamps up to 0.6
        assert_eq!(breakfast.factor, 0.6);
        let items: Vec<(&str, f64)> = breakfast.items.iter().map(|i| (i.food, i.grams)).collect();
        assert_eq!(items, vec![("chicken breast", 90.0), ("oats", 90.0), ("broccoli", 72.0)]);

        let lunch = plan.slot(&Meal::Lunch).unwrap();
        assert_eq!(lunch.target_calories, 600.0);
        let grams: Vec<f64> = lunch.items.iter().map(|i| i.grams).collect();
        assert_eq!(grams, vec![100.0, 100.0, 80.0, 13.0]);
        assert_eq!(lunch.items[3].food, "avocado");

        assert_eq!(plan.slot(&Meal::Snack).unwrap().items.len(), 3);
        assert_eq!(plan.slot(&Meal::Dinner).unwrap().items.len(), 4);
    }

    #[test]
    fn test_meal_plan_clamps_up() {
        // greek yogurt, apple, spinach: 194.1 kcal baseline against a 1500 kcal target
        let mut source = SequenceChoice::new(vec![4, 4, 1]);
        let plan = generate_meal_plan_with(&goals(6000.0), &mut source);
        let breakfast = plan.slot(&Meal::Breakfast).unwrap();
        assert_eq!(breakfast.factor, 1.6);
        let items: Vec<(&str, f64)> = breakfast.items.iter().map(|i| (i.food, i.grams)).collect();
        assert_eq!(
            items,
            vec![("greek yogurt (nonfat)", 240.0), ("apple", 240.0), ("spinach", 192.0)]
        );
    }

    #[test]
    fn test_meal_plan_factor_always_clamped() {
        for seed in 0..25 {
            for calories in [0.0, 800.0, 2000.0, 3500.0, 10_000.0] {
                let mut source = RngChoice(StdRng::seed_from_u64(seed));
                let plan = generate_meal_plan_with(&goals(calories), &mut source);
                for slot in &plan.slots {
                    assert!((MIN_SCALE_FACTOR..=MAX_SCALE_FACTOR).contains(&slot.factor));
                    assert!(slot.items.iter().all(|i| i.grams > 0.0));
                }
            }
        }
    }

    #[test]
    fn test_meal_plan_picks_from_categories() {
        let plan = generate_meal_plan(&goals(2200.0));
        for slot in &plan.slots {
            assert!(PROTEIN_FOODS.contains(&slot.items[0].food));
            assert!(CARB_FOODS.contains(&slot.items[1].food));
            assert!(VEGETABLE_FOODS.contains(&slot.items[2].food));
            if let Some(fat) = slot.items.get(3) {
                assert!(FAT_FOODS.contains(&fat.food));
            }
        }
        assert!(plan.totals().calories > 0.0);
    }
}
