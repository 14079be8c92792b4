use chrono::{NaiveDate, NaiveTime};

use crate::source::CellValue;
use crate::time_utils::{parse_date_text, parse_time_text};

// ── CountProcessor ────────────────────────────────────────────────────────────

/// Coerces a raw cell into a non-negative rep count.
pub struct CountProcessor;

impl CountProcessor {
    /// Accepts integers, integral floats (spreadsheets store every number as a
    /// float) and integer text. Returns a human-readable reason on failure.
    pub fn coerce(value: &CellValue) -> Result<u32, String> {
        match value {
            CellValue::Int(i) => Self::from_i64(*i),
            CellValue::Float(f) => {
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(format!("count {} is not a whole number", f));
                }
                if *f < 0.0 {
                    return Err(format!("count {} is negative", f));
                }
                if *f > f64::from(u32::MAX) {
                    return Err(format!("count {} is too large", f));
                }
                Ok(*f as u32)
            }
            CellValue::Text(s) => {
                let trimmed = s.trim();
                match trimmed.parse::<i64>() {
                    Ok(i) => Self::from_i64(i),
                    Err(_) => Err(format!("count \"{}\" is not a number", trimmed)),
                }
            }
            CellValue::Empty => Err("count is empty".to_string()),
            other => Err(format!("count \"{}\" is not a number", other.display())),
        }
    }

    fn from_i64(i: i64) -> Result<u32, String> {
        if i < 0 {
            return Err(format!("count {} is negative", i));
        }
        u32::try_from(i).map_err(|_| format!("count {} is too large", i))
    }
}

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Coerces a raw cell into a calendar date.
pub struct DateProcessor;

impl DateProcessor {
    /// Native date and datetime cells are used directly; text goes through
    /// [`parse_date_text`]. Returns `None` for anything else.
    pub fn coerce(value: &CellValue) -> Option<NaiveDate> {
        match value {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(s) => parse_date_text(s),
            _ => None,
        }
    }
}

// ── TimeProcessor ─────────────────────────────────────────────────────────────

/// Outcome of reading the `time` column, which is allowed to be blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeCell {
    Present(NaiveTime),
    Blank,
    Unreadable,
}

impl TimeCell {
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            TimeCell::Present(t) => Some(*t),
            _ => None,
        }
    }
}

/// Coerces a raw cell into a clock time.
pub struct TimeProcessor;

impl TimeProcessor {
    pub fn coerce(value: &CellValue) -> TimeCell {
        if value.is_empty() {
            return TimeCell::Blank;
        }
        let parsed = match value {
            CellValue::Time(t) => Some(*t),
            CellValue::DateTime(dt) => Some(dt.time()),
            CellValue::Text(s) => parse_time_text(s),
            _ => None,
        };
        match parsed {
            Some(t) => TimeCell::Present(t),
            None => TimeCell::Unreadable,
        }
    }
}

// ── TextProcessor ─────────────────────────────────────────────────────────────

/// Coerces a raw cell into trimmed text for the `location` / `exercise` columns.
pub struct TextProcessor;

impl TextProcessor {
    /// Returns `None` for blank cells.
    pub fn coerce(value: &CellValue) -> Option<String> {
        if value.is_empty() {
            return None;
        }
        Some(value.display())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
