//! Progress report logic.
//!
//! Turns a day's totals and goals into per-macro progress, text progress bars
//! and a motivation line. All functions are framework-agnostic and return
//! structured data or plain strings for the rendering layer.

use crate::core::ledger::DayLedger;
use crate::core::random::{ChoiceSource, choose};
use serde::Serialize;

/// Smallest goal used as a divisor, so a zero goal never divides by zero.
const MIN_GOAL: f64 = 1e-6;

/// Displayed percentages are capped here.
pub const MAX_DISPLAY_PERCENT: f64 = 999.0;

/// Coarse band of goal progress used to pick a motivation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressTier {
    /// Below 25%
    WarmUp,
    /// 25% to 50%
    Steady,
    /// 50% to 75%
    Strong,
    /// 75% up to the goal
    FinalStretch,
    /// Exactly on the goal
    GoalMet,
    /// Past the goal
    OverGoal,
}

impl ProgressTier {
    /// Tier for a `current / goal` ratio.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            Self::OverGoal
        } else if ratio < 0.25 {
            Self::WarmUp
        } else if ratio < 0.5 {
            Self::Steady
        } else if ratio < 0.75 {
            Self::Strong
        } else if ratio < 1.0 {
            Self::FinalStretch
        } else {
            Self::GoalMet
        }
    }

    /// Messages this tier draws from.
    #[must_use]
    pub const fn messages(self) -> &'static [&'static str] {
        match self {
            Self::WarmUp => &[
                "Warm-up phase. Stack small wins.",
                "One meal at a time.",
                "Momentum is loading...",
            ],
            Self::Steady => &[
                "Nice pace. Keep it steady.",
                "Solid progress. Keep logging!",
                "Consistency is the cheat code.",
            ],
            Self::Strong => &[
                "Strong progress. Finish focused.",
                "You're building momentum.",
                "Keep decisions clean.",
            ],
            Self::FinalStretch => &[
                "Final stretch. You're close.",
                "Dial it in with smart choices now.",
                "Almost there. Finish strong.",
            ],
            Self::GoalMet => &[
                "Goal met! Victory lap.",
                "Boom. That's how it's done.",
                "Nailed it. Repeat what worked.",
            ],
            Self::OverGoal => &[
                "Still a win. Awareness is power.",
                "Balance beats perfection. Tomorrow is a reset.",
                "Data over drama. Keep going.",
            ],
        }
    }
}

/// Picks a motivation message for `ratio`.
pub fn motivation<C: ChoiceSource + ?Sized>(ratio: f64, source: &mut C) -> &'static str {
    choose(ProgressTier::from_ratio(ratio).messages(), source)
        .copied()
        .unwrap_or_default()
}

/// Progress of one macro against its goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroProgress {
    /// "Calories", "Protein", ...
    pub label: &'static str,
    /// Unit for display
    pub unit: &'static str,
    /// Logged amount
    pub current: f64,
    /// Target
    pub goal: f64,
    /// `current / goal`, uncapped
    pub ratio: f64,
    /// Motivation band
    pub tier: ProgressTier,
}

impl MacroProgress {
    /// Percentage for display, capped at [`MAX_DISPLAY_PERCENT`].
    #[must_use]
    pub fn display_percent(&self) -> f64 {
        (self.ratio * 100.0).min(MAX_DISPLAY_PERCENT)
    }

    /// `current/goal unit (pct%)`, rounded for display.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{:.0}/{:.0} {} ({:.0}%)",
            self.current,
            self.goal.max(MIN_GOAL),
            self.unit,
            self.display_percent()
        )
    }
}

/// Progress ratio; a zero or negative goal counts as a tiny positive one.
#[must_use]
pub fn progress_ratio(current: f64, goal: f64) -> f64 {
    let goal = if goal.is_finite() { goal.max(MIN_GOAL) } else { MIN_GOAL };
    let current = if current.is_finite() { current } else { 0.0 };
    current / goal
}

/// One progress line per macro for the day.
#[must_use]
pub fn day_progress(ledger: &DayLedger) -> Vec<MacroProgress> {
    let totals = ledger.totals();
    let goals = ledger.goals;
    [
        ("Calories", "kcal", totals.calories, goals.calories),
        ("Protein", "g", totals.protein, goals.protein),
        ("Carbs", "g", totals.carbs, goals.carbs),
        ("Fat", "g", totals.fat, goals.fat),
    ]
    .into_iter()
    .map(|(label, unit, current, goal)| {
        let ratio = progress_ratio(current, goal);
        MacroProgress {
            label,
            unit,
            current,
            goal,
            ratio,
            tier: ProgressTier::from_ratio(ratio),
        }
    })
    .collect()
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`. The fill is
/// clamped to the bar; the label shows the capped display percentage.
///
/// # Arguments
/// * `ratio` - `current / goal`
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(ratio: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };

    // Cast safety: clamped ∈ [0, 1], length is small (10-20).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (clamped * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);
    let percent = (ratio * 100.0).min(MAX_DISPLAY_PERCENT);

    format!("[{filled_str}{empty_str}] {percent:.1}%")
}
