//! Chart data shared by the terminal and SVG renderers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formatting::capitalize;
use crate::models::MonthLabel;

/// One x-axis slot of a stacked bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBar {
    pub date: NaiveDate,
    /// Individual set counts for the day, bottom segment first, in the
    /// order the sets were performed. Empty for rest days.
    pub segments: Vec<u32>,
}

impl DayBar {
    pub fn total(&self) -> u64 {
        self.segments.iter().map(|c| u64::from(*c)).sum()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Per-day stacked bars for one exercise over one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedBarChart {
    pub title: String,
    pub exercise: String,
    pub month: MonthLabel,
    /// One bar per calendar day of the month.
    pub bars: Vec<DayBar>,
}

impl StackedBarChart {
    /// `"Pushups per day for November 2024"`.
    pub fn title_for(exercise: &str, month: MonthLabel) -> String {
        format!(
            "{} per day for {} {}",
            capitalize(exercise),
            month.month_name(),
            month.year
        )
    }

    /// `"Pushups for November 2024"` for one month, otherwise
    /// `"Pushups (cum. total) for 2024-10 through 2024-12"`.
    pub fn cumulative_title(exercise: &str, from: MonthLabel, to: MonthLabel) -> String {
        if from == to {
            format!("{} for {} {}", capitalize(exercise), from.month_name(), from.year)
        } else {
            format!(
                "{} (cum. total) for {}-{:02} through {}-{:02}",
                capitalize(exercise),
                from.year,
                from.month,
                to.year,
                to.month
            )
        }
    }

    /// Tallest bar height, `0` when every day is empty.
    pub fn max_total(&self) -> u64 {
        self.bars.iter().map(DayBar::total).max().unwrap_or(0)
    }
}

/// Running total of one exercise through a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub month: MonthLabel,
    /// `(day of month, running total)` for days with at least one set.
    pub points: Vec<(u32, u64)>,
}

impl CumulativeSeries {
    pub fn final_total(&self) -> u64 {
        self.points.last().map(|(_, t)| *t).unwrap_or(0)
    }
}

/// Something that can draw the month charts.
pub trait ChartRenderer {
    fn render_stacked_bar(&mut self, chart: &StackedBarChart) -> Result<()>;

    fn render_cumulative(&mut self, title: &str, series: &[CumulativeSeries]) -> Result<()>;
}
