//! Turns a [`RawTable`] into a sorted [`MonthTable`].
//!
//! Dates, locations and exercises are written once per block in the log, so
//! blanks in those columns inherit the value from the row above. Rows that
//! still lack an exercise or a count, or whose count or date cannot be read,
//! are reported as [`RowIssue`]s and skipped (or abort cleaning under
//! [`CleanPolicy::Strict`]).

use std::fmt;

use repcount_core::data_processors::{
    CountProcessor, DateProcessor, TextProcessor, TimeCell, TimeProcessor,
};
use repcount_core::error::{RepError, Result};
use repcount_core::models::{ExerciseSet, MonthTable};
use repcount_core::source::CellValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::reader::{RawRow, RawTable};

// ── Public types ──────────────────────────────────────────────────────────────

/// How row-level problems are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanPolicy {
    /// Skip the row and record an issue.
    #[default]
    Lenient,
    /// Fail on the first row that would be skipped.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    /// Exercise or count missing after forward-fill.
    Incomplete,
    InvalidCount,
    InvalidDate,
    /// A readable date that falls outside the sheet's month.
    OutOfMonth,
    /// The time could not be read; the row is kept without one.
    InvalidTime,
}

/// A problem found in one sheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: usize,
    pub kind: RowIssueKind,
    pub message: String,
}

impl RowIssue {
    /// Whether the row was dropped from the cleaned table.
    pub fn skipped(&self) -> bool {
        self.kind != RowIssueKind::InvalidTime
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// The cleaned table plus everything that was skipped or patched on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub table: MonthTable,
    pub issues: Vec<RowIssue>,
}

impl CleanOutcome {
    pub fn skipped_rows(&self) -> usize {
        self.issues.iter().filter(|i| i.skipped()).count()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Clean `raw` into a [`MonthTable`] sorted by `(date, time)`.
///
/// Sets without a time sort before timed sets of the same day; otherwise the
/// sheet order is preserved.
pub fn clean(raw: &RawTable, policy: CleanPolicy) -> Result<CleanOutcome> {
    let mut sets: Vec<ExerciseSet> = Vec::with_capacity(raw.rows.len());
    let mut issues: Vec<RowIssue> = Vec::new();
    let mut fill = ForwardFill::default();

    for row in &raw.rows {
        let filled = fill.apply(row);
        match clean_row(&filled, raw) {
            Ok((set, time_issue)) => {
                if let Some(issue) = time_issue {
                    warn!(sheet = %raw.sheet, "{}; keeping the set without a time", issue);
                    issues.push(issue);
                }
                sets.push(set);
            }
            Err(issue) => {
                if policy == CleanPolicy::Strict {
                    return Err(RepError::Data {
                        row: issue.row,
                        reason: issue.message,
                    });
                }
                warn!(sheet = %raw.sheet, "Skipping {}", issue);
                issues.push(issue);
            }
        }
    }

    sets.sort_by_key(|s| (s.date, s.time));

    debug!(
        "Cleaned sheet {}: {} rows in, {} sets out, {} issues",
        raw.sheet,
        raw.rows.len(),
        sets.len(),
        issues.len()
    );

    Ok(CleanOutcome {
        table: MonthTable::new(raw.month, sets),
        issues,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Remembers the last non-blank date, location and exercise.
#[derive(Default)]
struct ForwardFill {
    date: Option<CellValue>,
    location: Option<CellValue>,
    exercise: Option<CellValue>,
}

impl ForwardFill {
    fn apply(&mut self, row: &RawRow) -> RawRow {
        let mut out = row.clone();
        out.date = Self::carry(&mut self.date, &row.date);
        out.location = Self::carry(&mut self.location, &row.location);
        out.exercise = Self::carry(&mut self.exercise, &row.exercise);
        out
    }

    fn carry(last: &mut Option<CellValue>, cell: &CellValue) -> CellValue {
        if cell.is_empty() {
            last.clone().unwrap_or(CellValue::Empty)
        } else {
            *last = Some(cell.clone());
            cell.clone()
        }
    }
}

/// Build a set from a forward-filled row. A readable row may still carry a
/// time warning.
fn clean_row(
    row: &RawRow,
    raw: &RawTable,
) -> std::result::Result<(ExerciseSet, Option<RowIssue>), RowIssue> {
    let issue = |kind: RowIssueKind, message: String| RowIssue {
        row: row.row,
        kind,
        message,
    };

    let exercise = TextProcessor::coerce(&row.exercise)
        .ok_or_else(|| issue(RowIssueKind::Incomplete, "exercise is missing".to_string()))?;
    if row.count.is_empty() {
        return Err(issue(RowIssueKind::Incomplete, "count is missing".to_string()));
    }

    let count = CountProcessor::coerce(&row.count)
        .map_err(|reason| issue(RowIssueKind::InvalidCount, reason))?;

    let date = DateProcessor::coerce(&row.date).ok_or_else(|| {
        if row.date.is_empty() {
            issue(RowIssueKind::InvalidDate, "date is missing".to_string())
        } else {
            issue(
                RowIssueKind::InvalidDate,
                format!("date \"{}\" is not a date", row.date.display()),
            )
        }
    })?;
    if !raw.month.contains(date) {
        return Err(issue(
            RowIssueKind::OutOfMonth,
            format!("date {} is outside {}", date, raw.month),
        ));
    }

    let (time, time_issue) = match TimeProcessor::coerce(&row.time) {
        TimeCell::Present(t) => (Some(t), None),
        TimeCell::Blank => (None, None),
        TimeCell::Unreadable => (
            None,
            Some(issue(
                RowIssueKind::InvalidTime,
                format!("time \"{}\" is not a time", row.time.display()),
            )),
        ),
    };

    let set = ExerciseSet {
        location: TextProcessor::coerce(&row.location).unwrap_or_default(),
        exercise,
        date,
        time,
        count,
    };
    Ok((set, time_issue))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
