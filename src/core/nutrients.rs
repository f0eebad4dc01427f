//! Nutrient records and serving-size scaling.
//!
//! Every food source (offline lexicon, remote lookup, manual entry) is reduced
//! to the same four macro fields expressed per 100 units (grams, typically).
//! Scaling a record to a serving is a pure linear operation.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Calories and macronutrients. Used per 100 g for food records, per serving
/// for estimates and entries, and as signed deltas for remaining-to-goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein: f64,
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Fat in grams
    pub fat: f64,
}

/// A food's nutrients per 100 units.
pub type NutrientRecord = Macros;

/// A [`NutrientRecord`] scaled to a serving. Never persisted on its own.
pub type ServingEstimate = Macros;

impl Macros {
    /// All-zero record.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Builds a record from its four fields.
    #[must_use]
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Builds a record from possibly-absent fields, treating absent, non-finite
    /// and negative values as 0.
    #[must_use]
    pub fn from_optional(
        calories: Option<f64>,
        protein: Option<f64>,
        carbs: Option<f64>,
        fat: Option<f64>,
    ) -> Self {
        Self::new(
            sanitize(calories),
            sanitize(protein),
            sanitize(carbs),
            sanitize(fat),
        )
    }

    /// True when every field is zero. Remote candidates like this are junk.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbs == 0.0 && self.fat == 0.0
    }

    /// Field-wise `max(0, x)`.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        Self::new(
            self.calories.max(0.0),
            self.protein.max(0.0),
            self.carbs.max(0.0),
            self.fat.max(0.0),
        )
    }

    /// Multiplies every field by `factor`.
    #[must_use]
    pub fn times(self, factor: f64) -> Self {
        Self::new(
            self.calories * factor,
            self.protein * factor,
            self.carbs * factor,
            self.fat * factor,
        )
    }

    /// Divides every field by `divisor`.
    #[must_use]
    pub fn divided_by(self, divisor: f64) -> Self {
        Self::new(
            self.calories / divisor,
            self.protein / divisor,
            self.carbs / divisor,
            self.fat / divisor,
        )
    }

    /// Field-wise `self - other`. May go negative.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self::new(
            self.calories - other.calories,
            self.protein - other.protein,
            self.carbs - other.carbs,
            self.fat - other.fat,
        )
    }

    /// Returns the fields in `[calories, protein, carbs, fat]` order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.calories, self.protein, self.carbs, self.fat]
    }

    fn sanitized(self) -> Self {
        Self::from_optional(
            Some(self.calories),
            Some(self.protein),
            Some(self.carbs),
            Some(self.fat),
        )
    }
}

impl Add for Macros {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.calories + rhs.calories,
            self.protein + rhs.protein,
            self.carbs + rhs.carbs,
            self.fat + rhs.fat,
        )
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Scales a per-100 record to `grams`.
///
/// Never fails: non-finite or non-positive grams give an all-zero estimate,
/// and non-finite or negative record fields count as 0.
#[must_use]
pub fn scale(record: &NutrientRecord, grams: f64) -> ServingEstimate {
    let factor = if grams.is_finite() && grams > 0.0 {
        grams / 100.0
    } else {
        0.0
    };
    record.sanitized().times(factor)
}
