//! One function per `--view`: load, clean and compute what the view shows.
//!
//! Everything here returns data or writes text; `main` decides whether that
//! ends up on stdout, in an SVG file or in the terminal UI.

use std::io::Write;

use chrono::NaiveDate;
use tracing::{debug, warn};

use repcount_core::calculations::{ProjectionCalculator, StatisticsCalculator};
use repcount_core::chart::{ChartRenderer, CumulativeSeries, StackedBarChart};
use repcount_core::error::{RepError, Result};
use repcount_core::formatting::format_count;
use repcount_core::models::{DateRange, MonthLabel, ProjectionResult, StatSummary};
use repcount_core::report;
use repcount_core::settings::Settings;
use repcount_data::aggregator::{cumulative_series, stacked_bars};
use repcount_data::analysis::{analyze_file, analyze_months, default_range, MonthAnalysis};
use repcount_data::cleaner::CleanPolicy;
use repcount_data::reader::{month_sheets, open_document};

/// How results leave the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Tui,
    Plain,
    Json,
}

impl OutputMode {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.json {
            OutputMode::Json
        } else if settings.plain {
            OutputMode::Plain
        } else {
            OutputMode::Tui
        }
    }
}

pub fn policy(settings: &Settings) -> CleanPolicy {
    if settings.strict {
        CleanPolicy::Strict
    } else {
        CleanPolicy::Lenient
    }
}

fn load(settings: &Settings, label: MonthLabel) -> Result<MonthAnalysis> {
    let path = settings.require_file()?;
    debug!("Reading {} from {}", label, path.display());
    analyze_file(&path, label, policy(settings))
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ── sheets ────────────────────────────────────────────────────────────────────

/// Month sheets present in the document, oldest first.
pub fn sheets(settings: &Settings) -> Result<Vec<MonthLabel>> {
    let path = settings.require_file()?;
    let doc = open_document(&path)?;
    Ok(month_sheets(doc.as_ref()))
}

pub fn write_sheets(out: &mut dyn Write, labels: &[MonthLabel], mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Json {
        let names: Vec<String> = labels.iter().map(ToString::to_string).collect();
        return write_json(out, &names);
    }
    for label in labels {
        writeln!(out, "{}", label)?;
    }
    Ok(())
}

// ── stats ─────────────────────────────────────────────────────────────────────

/// Statistics range from `--start`/`--end`, defaulting to the month to date.
pub fn statistics_range(
    settings: &Settings,
    label: MonthLabel,
    today: NaiveDate,
) -> Result<DateRange> {
    let default = default_range(label, today);
    let range = DateRange::new(
        settings.start.unwrap_or(default.start),
        settings.end.unwrap_or(default.end),
    )?;
    if !label.contains(range.start) || !label.contains(range.end) {
        return Err(RepError::InvalidRange(format!(
            "{} to {} is not within {}",
            range.start, range.end, label
        )));
    }
    Ok(range)
}

pub fn statistics(settings: &Settings, today: NaiveDate) -> Result<(MonthAnalysis, StatSummary)> {
    let label = settings.month_label()?;
    let exercise = settings.require_exercise()?;
    let range = statistics_range(settings, label, today)?;
    let analysis = load(settings, label)?;
    let summary = StatisticsCalculator::require(&analysis.table, &exercise, range)?;
    Ok((analysis, summary))
}

pub fn write_statistics(
    out: &mut dyn Write,
    summary: &StatSummary,
    month: MonthLabel,
    mode: OutputMode,
) -> Result<()> {
    if mode == OutputMode::Json {
        return write_json(out, summary);
    }
    writeln!(out, "{}", report::statistics_report(summary, month))?;
    Ok(())
}

// ── projection ────────────────────────────────────────────────────────────────

/// Today for the current month, otherwise the month's last day (past) or
/// first day (future).
pub fn default_as_of(label: MonthLabel, today: NaiveDate) -> NaiveDate {
    if label.contains(today) {
        today
    } else if label.last_day() < today {
        label.last_day()
    } else {
        label.first_day()
    }
}

pub fn projection(
    settings: &Settings,
    today: NaiveDate,
) -> Result<(MonthAnalysis, ProjectionResult)> {
    let label = settings.month_label()?;
    let exercise = settings.require_exercise()?;
    let goal = settings.require_goal()?;
    let as_of = settings.as_of.unwrap_or_else(|| default_as_of(label, today));

    let analysis = load(settings, label)?;
    if !analysis.table.has_exercise(&exercise) {
        warn!("No {} sets recorded in {}", exercise, label);
    }
    let result = ProjectionCalculator::project(&analysis.table, &exercise, goal, as_of)?;
    Ok((analysis, result))
}

pub fn write_projection(
    out: &mut dyn Write,
    result: &ProjectionResult,
    mode: OutputMode,
) -> Result<()> {
    if mode == OutputMode::Json {
        return write_json(out, result);
    }
    writeln!(out, "{}", report::projection_report(result))?;
    Ok(())
}

// ── chart ─────────────────────────────────────────────────────────────────────

pub fn stacked_chart(settings: &Settings) -> Result<StackedBarChart> {
    let label = settings.month_label()?;
    let exercise = settings.require_exercise()?;
    let analysis = load(settings, label)?;
    if !analysis.table.has_exercise(&exercise) {
        warn!("No {} sets recorded in {}; the chart will be empty", exercise, label);
    }
    Ok(stacked_bars(&analysis.table, &exercise))
}

/// Text rendition of the stacked chart: one line per day with its sets.
pub fn write_stacked_chart(
    out: &mut dyn Write,
    chart: &StackedBarChart,
    mode: OutputMode,
) -> Result<()> {
    if mode == OutputMode::Json {
        return write_json(out, chart);
    }
    writeln!(out, "{}", chart.title)?;
    for bar in &chart.bars {
        let sets: Vec<String> = bar.segments.iter().map(ToString::to_string).collect();
        if sets.is_empty() {
            writeln!(out, "{:>2}: 0", bar.day())?;
        } else {
            writeln!(
                out,
                "{:>2}: {} ({})",
                bar.day(),
                format_count(bar.total()),
                sets.join(" + ")
            )?;
        }
    }
    Ok(())
}

// ── cumulative ────────────────────────────────────────────────────────────────

/// Title and one running-total series per month of `--from-month..--to-month`.
pub fn cumulative(settings: &Settings) -> Result<(String, Vec<CumulativeSeries>)> {
    let (from, to) = settings.month_span()?;
    let exercise = settings.require_exercise()?;
    let path = settings.require_file()?;
    let months = analyze_months(&path, from, to, policy(settings))?;
    let series = months
        .iter()
        .map(|m| cumulative_series(&m.table, &exercise))
        .collect();
    Ok((StackedBarChart::cumulative_title(&exercise, from, to), series))
}

pub fn write_cumulative(
    out: &mut dyn Write,
    title: &str,
    series: &[CumulativeSeries],
    mode: OutputMode,
) -> Result<()> {
    if mode == OutputMode::Json {
        return write_json(out, &series);
    }
    writeln!(out, "{}", title)?;
    for s in series {
        writeln!(out, "{}: {}", s.month, format_count(s.final_total()))?;
    }
    Ok(())
}

// ── chart output ──────────────────────────────────────────────────────────────

/// Draw whichever chart `settings.view` asks for with `renderer`.
pub fn render_chart(settings: &Settings, renderer: &mut dyn ChartRenderer) -> Result<()> {
    match settings.view.as_str() {
        "cumulative" => {
            let (title, series) = cumulative(settings)?;
            renderer.render_cumulative(&title, &series)
        }
        _ => {
            let chart = stacked_chart(settings)?;
            renderer.render_stacked_bar(&chart)
        }
    }
}

// ── sets ──────────────────────────────────────────────────────────────────────

pub fn month_sets(settings: &Settings) -> Result<MonthAnalysis> {
    load(settings, settings.month_label()?)
}

pub fn write_sets(
    out: &mut dyn Write,
    analysis: &MonthAnalysis,
    exercise: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let sets: Vec<_> = match exercise {
        Some(name) => analysis.table.for_exercise(name).collect(),
        None => analysis.table.sets.iter().collect(),
    };
    if mode == OutputMode::Json {
        return write_json(out, &sets);
    }
    for set in sets {
        let time = set
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{} {:>5} {} {} {}",
            set.date, time, set.location, set.exercise, set.count
        )?;
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
