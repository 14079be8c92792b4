//! Plain-text statistics and projection reports.
//!
//! Both the `--plain` output and the TUI report panels are built from the
//! line lists returned here.

use chrono::Datelike;

use crate::formatting::{format_count, format_day_month_year, format_optional, format_rate};
use crate::models::{DailyRate, MonthLabel, ProjectionResult, StatSummary};

const INDENT: &str = "   ";

/// Header naming the exercise, month and, when the range is partial, its end.
///
/// * whole month: `"PUSHUPS FOR 11/2024"`
/// * month start to a day: `"PUSHUPS FOR 11/2024 AS OF 17/11/2024"`
/// * anything else: `"PUSHUPS FOR 11/2024 FROM 3/11/2024 TO 9/11/2024"`
pub fn statistics_header(summary: &StatSummary, month: MonthLabel) -> String {
    let base = format!(
        "{} FOR {}/{}",
        summary.exercise.to_uppercase(),
        month.month,
        month.year
    );
    let range = summary.range;
    if range.start == month.first_day() && range.end == month.last_day() {
        base
    } else if range.start == month.first_day() {
        format!("{} AS OF {}", base, format_day_month_year(range.end))
    } else {
        format!(
            "{} FROM {} TO {}",
            base,
            format_day_month_year(range.start),
            format_day_month_year(range.end)
        )
    }
}

/// Header line followed by a dashed underline of the same width.
fn underlined(header: String) -> Vec<String> {
    let rule = "-".repeat(header.chars().count());
    vec![header, rule]
}

/// Statistics block, one entry per output line.
pub fn statistics_lines(summary: &StatSummary, month: MonthLabel) -> Vec<String> {
    let mut lines = underlined(statistics_header(summary, month));
    lines.push(format!("Total: {}", format_count(summary.total)));
    lines.push(format!(
        "Days done: {} of {}",
        summary.days_active, summary.days_in_range
    ));
    lines.push("Per set:".to_string());
    lines.push(format!(
        "{INDENT}max: {}",
        summary
            .max_per_set
            .map(|m| format_count(u64::from(m)))
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!("{INDENT}mean: {}", format_optional(summary.mean_per_set, 2)));
    lines.push(format!(
        "{INDENT}median: {}",
        format_optional(summary.median_per_set, 2)
    ));
    lines.push("Per day:".to_string());
    lines.push(format!(
        "{INDENT}max: {}",
        summary
            .max_per_day
            .map(format_count)
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "{INDENT}mean: {}",
        format_optional(summary.mean_per_active_day, 2)
    ));
    lines.push(format!(
        "{INDENT}median: {}",
        format_optional(summary.median_per_active_day, 2)
    ));
    lines.push(format!(
        "{INDENT}mean, inc: {}",
        format_optional(Some(summary.mean_per_day), 2)
    ));
    lines.push(format!(
        "{INDENT}median, inc: {}",
        format_optional(Some(summary.median_per_day), 2)
    ));
    lines
}

pub fn statistics_report(summary: &StatSummary, month: MonthLabel) -> String {
    statistics_lines(summary, month).join("\n")
}

/// `"PUSHUPS FOR 11/2024 AS OF 17/11/2024"`.
pub fn projection_header(projection: &ProjectionResult) -> String {
    format!(
        "{} FOR {}/{} AS OF {}",
        projection.exercise.to_uppercase(),
        projection.month.month,
        projection.month.year,
        format_day_month_year(projection.as_of)
    )
}

/// Projection block, one entry per output line.
pub fn projection_lines(projection: &ProjectionResult) -> Vec<String> {
    let month = projection.month;
    let mut lines = underlined(projection_header(projection));
    lines.push(format!("So far today: {}", format_count(projection.today_total)));
    lines.push(format!(
        "So far this month: {}",
        format_count(projection.current_total)
    ));
    lines.push(format!(
        "To reach {} by {}/{}:",
        format_count(projection.goal),
        month.month,
        month.last_day().day()
    ));
    lines.push(format!(
        "{INDENT}As of this morning: {}",
        format_rate(&DailyRate::Required(projection.morning_rate))
    ));

    let now = match projection.required_daily_rate {
        DailyRate::Required(_) if projection.goal_met() => "goal reached".to_string(),
        rate => format_rate(&rate),
    };
    lines.push(format!("{INDENT}As of now: {}", now));
    lines
}

pub fn projection_report(projection: &ProjectionResult) -> String {
    projection_lines(projection).join("\n")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
