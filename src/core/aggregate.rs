//! Time-range aggregation over day ledgers.
//!
//! Windows are lists of dates in chronological order. Summaries zero-fill
//! every date without a ledger and average over the full window length, not
//! over the days that happen to have data.

use crate::core::ledger::DayLedger;
use crate::core::nutrients::Macros;
use crate::errors::{Error, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    /// Calendar year
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
}

impl YearMonth {
    /// Month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Every date in this month.
    #[must_use]
    pub fn dates(self) -> Vec<NaiveDate> {
        month_dates(self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDate {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// One of the four tracked metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// kcal
    Calories,
    /// Protein grams
    Protein,
    /// Carbohydrate grams
    Carbs,
    /// Fat grams
    Fat,
}

impl Metric {
    /// Reads this metric out of a record.
    #[must_use]
    pub const fn of(self, macros: &Macros) -> f64 {
        match self {
            Self::Calories => macros.calories,
            Self::Protein => macros.protein,
            Self::Carbs => macros.carbs,
            Self::Fat => macros.fat,
        }
    }
}

/// Totals for one date of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotals {
    /// The date
    pub date: NaiveDate,
    /// Field-wise sum of that day's entries, zero when no ledger exists
    pub totals: Macros,
}

/// Summary of a contiguous run of dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateWindow {
    /// One item per requested date, in order
    pub per_day: Vec<DayTotals>,
    /// Field-wise sum over the window
    pub sum: Macros,
    /// `sum / per_day.len()`, or zero for an empty window
    pub avg: Macros,
}

impl AggregateWindow {
    /// Values of one metric, one per day, for charting.
    #[must_use]
    pub fn series(&self, metric: Metric) -> Vec<f64> {
        self.per_day.iter().map(|d| metric.of(&d.totals)).collect()
    }
}

/// Analytics tab: trailing week, trailing 30 days, or a calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsView {
    /// Last 7 days
    #[default]
    Week,
    /// Last 30 days
    Month,
    /// A selected calendar month
    Calendar,
}

/// `days_back` dates ending at `end`, oldest first.
#[must_use]
pub fn build_range(end: NaiveDate, days_back: usize) -> Vec<NaiveDate> {
    (0..days_back as u64)
        .rev()
        .filter_map(|offset| end.checked_sub_days(Days::new(offset)))
        .collect()
}

/// Every date of `month` (1-12) in `year`, in order. Empty for an invalid month.
#[must_use]
pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect()
}

/// Totals of one date, zero when no ledger exists.
#[must_use]
pub fn day_totals(days: &BTreeMap<NaiveDate, DayLedger>, date: NaiveDate) -> Macros {
    days.get(&date).map_or(Macros::ZERO, DayLedger::totals)
}

/// Summarizes `dates` against the stored ledgers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(days: &BTreeMap<NaiveDate, DayLedger>, dates: &[NaiveDate]) -> AggregateWindow {
    let per_day: Vec<DayTotals> = dates
        .iter()
        .map(|&date| DayTotals {
            date,
            totals: day_totals(days, date),
        })
        .collect();

    let sum: Macros = per_day.iter().map(|d| d.totals).sum();
    let avg = if dates.is_empty() {
        Macros::ZERO
    } else {
        sum.divided_by(dates.len() as f64)
    };

    AggregateWindow { per_day, sum, avg }
}

/// Distinct months that have a stored ledger, oldest first.
#[must_use]
pub fn available_months(days: &BTreeMap<NaiveDate, DayLedger>) -> Vec<YearMonth> {
    days.keys()
        .map(|&d| YearMonth::of(d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Dates covered by `view` as of `today`.
///
/// The calendar view uses `selected`, else the latest month with data, else
/// the month of `today`.
#[must_use]
pub fn window_dates(
    view: AnalyticsView,
    today: NaiveDate,
    selected: Option<YearMonth>,
    days: &BTreeMap<NaiveDate, DayLedger>,
) -> Vec<NaiveDate> {
    match view {
        AnalyticsView::Week => build_range(today, 7),
        AnalyticsView::Month => build_range(today, 30),
        AnalyticsView::Calendar => selected
            .or_else(|| available_months(days).last().copied())
            .unwrap_or_else(|| YearMonth::of(today))
            .dates(),
    }
}
