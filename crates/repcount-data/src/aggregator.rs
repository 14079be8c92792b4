//! Per-day aggregation of a cleaned month for the charts.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use repcount_core::calculations::StatisticsCalculator;
use repcount_core::chart::{CumulativeSeries, DayBar, StackedBarChart};
use repcount_core::models::{DateRange, MonthTable};

/// Total of `exercise` for every day of `range`, zero days included.
pub fn daily_totals(table: &MonthTable, exercise: &str, range: DateRange) -> Vec<(NaiveDate, u64)> {
    StatisticsCalculator::daily_totals(table, exercise, range)
}

/// One bar per calendar day of the month, each split into its sets.
///
/// Segments follow the table order, so the first set of the day sits at
/// the bottom of the bar.
pub fn stacked_bars(table: &MonthTable, exercise: &str) -> StackedBarChart {
    let mut by_date: BTreeMap<NaiveDate, Vec<u32>> = BTreeMap::new();
    for set in table.for_exercise(exercise) {
        by_date.entry(set.date).or_default().push(set.count);
    }

    let bars = table
        .month
        .days()
        .map(|date| DayBar {
            date,
            segments: by_date.remove(&date).unwrap_or_default(),
        })
        .collect();

    StackedBarChart {
        title: StackedBarChart::title_for(exercise, table.month),
        exercise: exercise.to_string(),
        month: table.month,
        bars,
    }
}

/// Running total of `exercise` on each day it was done.
pub fn cumulative_series(table: &MonthTable, exercise: &str) -> CumulativeSeries {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for set in table.for_exercise(exercise) {
        *by_date.entry(set.date).or_default() += u64::from(set.count);
    }

    let mut running = 0u64;
    let points = by_date
        .into_iter()
        .map(|(date, total)| {
            running += total;
            (date.day(), running)
        })
        .collect();

    CumulativeSeries {
        month: table.month,
        points,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_core::models::{ExerciseSet, MonthLabel};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, day).unwrap()
    }

    fn set(exercise: &str, day: u32, count: u32) -> ExerciseSet {
        ExerciseSet {
            location: "home".to_string(),
            exercise: exercise.to_string(),
            date: d(day),
            time: None,
            count,
        }
    }

    /// Pushups on days 1, 3 and 5 only.
    fn table() -> MonthTable {
        MonthTable::new(
            MonthLabel::new(2024, 11).unwrap(),
            vec![
                set("pushups", 1, 20),
                set("pushups", 1, 10),
                set("pullups", 2, 8),
                set("pushups", 3, 25),
                set("pushups", 5, 5),
                set("pushups", 5, 15),
            ],
        )
    }

    #[test]
    fn test_daily_totals_fill_gaps_with_zero() {
        let totals = daily_totals(&table(), "pushups", DateRange::new(d(1), d(5)).unwrap());
        assert_eq!(
            totals,
            vec![(d(1), 30), (d(2), 0), (d(3), 25), (d(4), 0), (d(5), 20)]
        );
    }

    #[test]
    fn test_stacked_bars_cover_every_day() {
        let chart = stacked_bars(&table(), "pushups");
        assert_eq!(chart.bars.len(), 30);
        assert_eq!(chart.title, "Pushups per day for November 2024");
        assert_eq!(chart.bars[0].segments, vec![20, 10]);
        assert!(chart.bars[1].segments.is_empty());
        assert_eq!(chart.bars[4].segments, vec![5, 15]);
        assert_eq!(chart.bars[29].date, d(30));
        assert_eq!(chart.max_total(), 30);
    }

    #[test]
    fn test_stacked_bars_unknown_exercise_is_all_empty() {
        let chart = stacked_bars(&table(), "dips");
        assert_eq!(chart.bars.len(), 30);
        assert_eq!(chart.max_total(), 0);
    }

    #[test]
    fn test_cumulative_series_only_active_days() {
        let series = cumulative_series(&table(), "pushups");
        assert_eq!(series.points, vec![(1, 30), (3, 55), (5, 75)]);
        assert_eq!(series.final_total(), 75);
    }
}
