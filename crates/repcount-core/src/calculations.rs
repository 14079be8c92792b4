use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{RepError, Result};
use crate::models::{DailyRate, DateRange, MonthTable, ProjectionResult, StatSummary};

// ── Percentile helper ─────────────────────────────────────────────────────────

/// The `p`-th percentile of a **sorted** slice with linear interpolation
/// between the two nearest ranks.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    let (first, last) = (sorted_data.first()?, sorted_data.last()?);
    if sorted_data.len() == 1 || p <= 0.0 {
        return Some(*first);
    }
    if p >= 100.0 {
        return Some(*last);
    }
    let rank = (p / 100.0) * (sorted_data.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile(&sorted, 50.0)
}

// ── StatisticsCalculator ──────────────────────────────────────────────────────

/// Stateless descriptive statistics over a cleaned month.
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Summarise `exercise` over `range` (inclusive).
    ///
    /// Never fails: a range with no matching sets yields zero totals and
    /// `None` for every per-set figure. Use [`Self::require`] when an empty
    /// result should be an error.
    pub fn statistics(table: &MonthTable, exercise: &str, range: DateRange) -> StatSummary {
        let mut set_counts: Vec<f64> = Vec::new();
        let mut max_per_set: Option<u32> = None;
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        for set in table.in_range(exercise, range) {
            set_counts.push(f64::from(set.count));
            max_per_set = Some(max_per_set.map_or(set.count, |m| m.max(set.count)));
            *by_date.entry(set.date).or_default() += u64::from(set.count);
        }

        let total: u64 = by_date.values().sum();
        let set_count = set_counts.len() as u32;
        let days_in_range = range.days();
        let days_active = by_date.len() as u32;

        let every_day: Vec<f64> = range
            .dates()
            .map(|d| by_date.get(&d).copied().unwrap_or(0) as f64)
            .collect();
        let active_days: Vec<f64> = by_date.values().map(|v| *v as f64).collect();

        let mean_per_set = (set_count > 0).then(|| total as f64 / f64::from(set_count));
        let mean_per_active_day = (days_active > 0).then(|| total as f64 / f64::from(days_active));

        StatSummary {
            exercise: exercise.to_string(),
            range,
            total,
            set_count,
            mean_per_set,
            median_per_set: median(&set_counts),
            max_per_set,
            mean_per_day: total as f64 / f64::from(days_in_range.max(1)),
            median_per_day: median(&every_day).unwrap_or(0.0),
            days_in_range,
            days_active,
            max_per_day: by_date.values().copied().max(),
            mean_per_active_day,
            median_per_active_day: median(&active_days),
        }
    }

    /// Like [`Self::statistics`] but fails with [`RepError::NoData`] when no
    /// set of `exercise` falls within `range`.
    pub fn require(table: &MonthTable, exercise: &str, range: DateRange) -> Result<StatSummary> {
        let summary = Self::statistics(table, exercise, range);
        if summary.set_count == 0 {
            return Err(RepError::NoData {
                exercise: exercise.to_string(),
                start: range.start,
                end: range.end,
            });
        }
        Ok(summary)
    }

    /// Total of `exercise` for every calendar day of `range`, zero days
    /// included, in date order.
    pub fn daily_totals(
        table: &MonthTable,
        exercise: &str,
        range: DateRange,
    ) -> Vec<(NaiveDate, u64)> {
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for set in table.in_range(exercise, range) {
            *by_date.entry(set.date).or_default() += u64::from(set.count);
        }
        range
            .dates()
            .map(|d| (d, by_date.get(&d).copied().unwrap_or(0)))
            .collect()
    }
}

// ── ProjectionCalculator ──────────────────────────────────────────────────────

/// Stateless month-end goal projections.
pub struct ProjectionCalculator;

impl ProjectionCalculator {
    /// Pace needed over the rest of the month for `exercise` to reach `goal`.
    ///
    /// `as_of` counts as already done. Fails with [`RepError::InvalidRange`]
    /// when `as_of` is not in the table's month.
    pub fn project(
        table: &MonthTable,
        exercise: &str,
        goal: u64,
        as_of: NaiveDate,
    ) -> Result<ProjectionResult> {
        let month = table.month;
        if !month.contains(as_of) {
            return Err(RepError::InvalidRange(format!(
                "as-of date {} is outside {}",
                as_of, month
            )));
        }

        let to_date = DateRange::new(month.first_day(), as_of)?;
        let mut current_total = 0u64;
        let mut today_total = 0u64;
        for set in table.in_range(exercise, to_date) {
            current_total += u64::from(set.count);
            if set.date == as_of {
                today_total += u64::from(set.count);
            }
        }

        let remaining_days = u32::try_from((month.last_day() - as_of).num_days()).unwrap_or(0);
        let required_daily_rate = Self::required_rate(goal, current_total, remaining_days);

        let before_today = current_total - today_total;
        let morning_rate =
            goal.saturating_sub(before_today) as f64 / f64::from(remaining_days + 1);

        Ok(ProjectionResult {
            exercise: exercise.to_string(),
            month,
            as_of,
            goal,
            current_total,
            today_total,
            remaining_days,
            required_daily_rate,
            morning_rate,
        })
    }

    /// `max(0, goal − current) / remaining_days`.
    ///
    /// With no days remaining the rate is `0.0` if the goal is met and
    /// [`DailyRate::Undefined`] otherwise.
    pub fn required_rate(goal: u64, current_total: u64, remaining_days: u32) -> DailyRate {
        let shortfall = goal.saturating_sub(current_total);
        if remaining_days == 0 {
            return if shortfall == 0 {
                DailyRate::Required(0.0)
            } else {
                DailyRate::Undefined
            };
        }
        DailyRate::Required(shortfall as f64 / f64::from(remaining_days))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
