use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RepError, Result};
use crate::time_utils;

// ── MonthLabel ────────────────────────────────────────────────────────────────

/// Identifier of one month sheet, displayed as `"YYYY-MonthName"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthLabel {
    pub year: i32,
    pub month: u32,
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{4})-([A-Za-z]+|\d{1,2})\s*$").expect("month label regex is valid")
    })
}

impl MonthLabel {
    /// Build a label, rejecting month numbers outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(RepError::InvalidMonthLabel(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The label of the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        time_utils::last_day_of_month(self.year, self.month).unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        time_utils::days_in_month(self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Full English month name, e.g. `"November"`.
    pub fn month_name(&self) -> &'static str {
        time_utils::month_name(self.month).unwrap_or("Unknown")
    }

    /// Every calendar day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days_in_month()).filter_map(move |offset| {
            first.checked_add_days(chrono::Days::new(u64::from(offset)))
        })
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Inclusive sequence of labels from `self` to `end`; empty when inverted.
    pub fn through(&self, end: MonthLabel) -> Vec<MonthLabel> {
        let mut labels = Vec::new();
        let mut current = *self;
        while current <= end {
            labels.push(current);
            current = current.next();
        }
        labels
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month_name())
    }
}

impl FromStr for MonthLabel {
    type Err = RepError;

    /// Accepts `"2024-November"`, `"2024-nov"` and `"2024-11"`.
    fn from_str(s: &str) -> Result<Self> {
        let caps = label_regex()
            .captures(s)
            .ok_or_else(|| RepError::InvalidMonthLabel(s.to_string()))?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| RepError::InvalidMonthLabel(s.to_string()))?;
        let month = time_utils::parse_month(&caps[2])
            .ok_or_else(|| RepError::InvalidMonthLabel(s.to_string()))?;
        Ok(Self { year, month })
    }
}

// ── ExerciseSet / MonthTable ──────────────────────────────────────────────────

/// One recorded set: a single row of a month sheet after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub location: String,
    pub exercise: String,
    pub date: NaiveDate,
    /// Clock time of the set; absent when the sheet left it blank or unreadable.
    pub time: Option<NaiveTime>,
    /// Reps (or seconds, for timed holds). The unit is whatever the sheet uses.
    pub count: u32,
}

/// The cleaned sets of one month, sorted by `(date, time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTable {
    pub month: MonthLabel,
    pub sets: Vec<ExerciseSet>,
}

impl MonthTable {
    pub fn new(month: MonthLabel, sets: Vec<ExerciseSet>) -> Self {
        Self { month, sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sets whose exercise name matches `exercise` exactly (case-sensitive).
    pub fn for_exercise<'a>(&'a self, exercise: &'a str) -> impl Iterator<Item = &'a ExerciseSet> {
        self.sets.iter().filter(move |s| s.exercise == exercise)
    }

    /// Sets of `exercise` whose date lies within `range`.
    pub fn in_range<'a>(
        &'a self,
        exercise: &'a str,
        range: DateRange,
    ) -> impl Iterator<Item = &'a ExerciseSet> {
        self.for_exercise(exercise)
            .filter(move |s| range.contains(s.date))
    }

    /// Distinct exercise names in order of first appearance.
    pub fn exercises(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for set in &self.sets {
            if !seen.iter().any(|e| e == &set.exercise) {
                seen.push(set.exercise.clone());
            }
        }
        seen
    }

    pub fn has_exercise(&self, exercise: &str) -> bool {
        self.sets.iter().any(|s| s.exercise == exercise)
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RepError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole of `month`.
    pub fn month(month: MonthLabel) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the range, counting both ends.
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// ── StatSummary ───────────────────────────────────────────────────────────────

/// Descriptive statistics for one exercise over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub exercise: String,
    pub range: DateRange,
    pub total: u64,
    pub set_count: u32,
    /// `None` when no sets matched.
    pub mean_per_set: Option<f64>,
    pub median_per_set: Option<f64>,
    pub max_per_set: Option<u32>,
    /// Total divided by every calendar day in the range, active or not.
    pub mean_per_day: f64,
    /// Median daily total over every calendar day in the range.
    pub median_per_day: f64,
    pub days_in_range: u32,
    /// Distinct dates with at least one set.
    pub days_active: u32,
    pub max_per_day: Option<u64>,
    pub mean_per_active_day: Option<f64>,
    pub median_per_active_day: Option<f64>,
}

// ── ProjectionResult ──────────────────────────────────────────────────────────

/// Daily pace needed to reach a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DailyRate {
    /// Reps per remaining day. `0.0` once the goal has been reached.
    Required(f64),
    /// The goal is unmet and no days remain.
    Undefined,
}

impl DailyRate {
    pub fn value(&self) -> Option<f64> {
        match self {
            DailyRate::Required(v) => Some(*v),
            DailyRate::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, DailyRate::Undefined)
    }
}

/// Pace required for the rest of the month to reach `goal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub exercise: String,
    pub month: MonthLabel,
    pub as_of: NaiveDate,
    pub goal: u64,
    /// Month start through `as_of`, inclusive.
    pub current_total: u64,
    /// Sets recorded on `as_of` itself.
    pub today_total: u64,
    /// Days after `as_of` until month end; `as_of` counts as done.
    pub remaining_days: u32,
    /// Pace from tomorrow on, given everything done so far.
    pub required_daily_rate: DailyRate,
    /// Pace from this morning on, as if none of today's sets had happened.
    pub morning_rate: f64,
}

impl ProjectionResult {
    /// Reps still needed to hit the goal (never negative).
    pub fn shortfall(&self) -> u64 {
        self.goal.saturating_sub(self.current_total)
    }

    pub fn goal_met(&self) -> bool {
        self.current_total >= self.goal
    }

    /// The required daily rate, or [`RepError::DivisionUndefined`].
    pub fn rate(&self) -> Result<f64> {
        self.required_daily_rate
            .value()
            .ok_or_else(|| RepError::DivisionUndefined {
                exercise: self.exercise.clone(),
                shortfall: self.shortfall(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
