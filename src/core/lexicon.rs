//! The fixed offline food table.
//!
//! Values are typical per-100 g figures. The table is a static slice so lookups
//! never allocate and iteration order is stable, which the offline matcher and
//! the suggestion ranking both rely on for deterministic tie-breaking.

use crate::core::nutrients::{Macros, NutrientRecord};

/// One named food in the offline table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconEntry {
    /// Lower-case display name, also the match key
    pub name: &'static str,
    /// Nutrients per 100 g
    pub record: NutrientRecord,
}

const fn entry(name: &'static str, calories: f64, protein: f64, carbs: f64, fat: f64) -> LexiconEntry {
    LexiconEntry {
        name,
        record: Macros::new(calories, protein, carbs, fat),
    }
}

/// Offline lexicon, in fixed iteration order.
pub const LEXICON: &[LexiconEntry] = &[
    entry("chicken breast", 165.0, 31.0, 0.0, 3.6),
    entry("salmon", 208.0, 20.0, 0.0, 13.0),
    entry("egg", 143.0, 13.0, 1.1, 10.0),
    entry("greek yogurt (nonfat)", 59.0, 10.0, 3.6, 0.4),
    entry("oats", 389.0, 16.9, 66.3, 6.9),
    entry("brown rice (cooked)", 111.0, 2.6, 23.0, 0.9),
    entry("banana", 89.0, 1.1, 22.8, 0.3),
    entry("apple", 52.0, 0.3, 13.8, 0.2),
    entry("broccoli", 34.0, 2.8, 6.6, 0.4),
    entry("spinach", 23.0, 2.9, 3.6, 0.4),
    entry("avocado", 160.0, 2.0, 8.5, 14.7),
    entry("olive oil", 884.0, 0.0, 0.0, 100.0),
    entry("almonds", 579.0, 21.2, 21.6, 49.9),
    entry("peanut butter", 588.0, 25.1, 20.0, 50.0),
    entry("tuna (canned in water)", 116.0, 26.0, 0.0, 1.0),
    entry("tofu", 144.0, 15.7, 3.9, 8.7),
    entry("lentils (cooked)", 116.0, 9.0, 20.1, 0.4),
    entry("sweet potato", 86.0, 1.6, 20.1, 0.1),
];

/// Meal-plan protein sources.
pub const PROTEIN_FOODS: &[&str] = &[
    "chicken breast",
    "tuna (canned in water)",
    "tofu",
    "egg",
    "greek yogurt (nonfat)",
    "salmon",
];

/// Meal-plan carbohydrate sources.
pub const CARB_FOODS: &[&str] = &[
    "oats",
    "brown rice (cooked)",
    "sweet potato",
    "banana",
    "apple",
    "lentils (cooked)",
];

/// Meal-plan vegetables.
pub const VEGETABLE_FOODS: &[&str] = &["broccoli", "spinach"];

/// Meal-plan fat sources.
pub const FAT_FOODS: &[&str] = &["avocado", "olive oil", "almonds", "peanut butter"];

/// Exact-name lookup.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static LexiconEntry> {
    LEXICON.iter().find(|e| e.name == name)
}

/// Resolves a category list against the lexicon, dropping names it doesn't hold.
#[must_use]
pub fn resolve_category(names: &[&str]) -> Vec<&'static LexiconEntry> {
    names.iter().filter_map(|name| lookup(name)).collect()
}
