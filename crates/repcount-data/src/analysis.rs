//! Load-and-clean pipeline for one or more month sheets.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use repcount_core::error::Result;
use repcount_core::models::{DateRange, MonthLabel, MonthTable};
use repcount_core::source::Document;
use tracing::{debug, info};

use crate::cleaner::{clean, CleanPolicy, RowIssue};
use crate::reader::{load_month, open_document};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a cleaned month.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub sheet: String,
    /// Non-empty data rows under the header.
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    /// Wall-clock seconds spent reading and validating the sheet.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent cleaning rows.
    pub clean_time_seconds: f64,
}

/// The output of [`analyze_month`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthAnalysis {
    pub table: MonthTable,
    pub issues: Vec<RowIssue>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load the sheet for `label` from `doc` and clean it.
pub fn analyze_month(
    doc: &mut dyn Document,
    label: MonthLabel,
    policy: CleanPolicy,
) -> Result<MonthAnalysis> {
    let load_start = std::time::Instant::now();
    let raw = load_month(doc, label)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let clean_start = std::time::Instant::now();
    let outcome = clean(&raw, policy)?;
    let clean_time = clean_start.elapsed().as_secs_f64();

    let rows_skipped = outcome.skipped_rows();
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        sheet: raw.sheet.clone(),
        rows_read: raw.rows.len(),
        rows_kept: outcome.table.len(),
        rows_skipped,
        load_time_seconds: load_time,
        clean_time_seconds: clean_time,
    };

    info!(
        "Loaded {}: {} sets kept, {} rows skipped",
        metadata.sheet, metadata.rows_kept, metadata.rows_skipped
    );

    Ok(MonthAnalysis {
        table: outcome.table,
        issues: outcome.issues,
        metadata,
    })
}

/// Open the document at `path` and analyse one month.
pub fn analyze_file(path: &Path, label: MonthLabel, policy: CleanPolicy) -> Result<MonthAnalysis> {
    let mut doc = open_document(path)?;
    analyze_month(doc.as_mut(), label, policy)
}

/// Analyse every month from `from` through `to`, inclusive.
///
/// Fails on the first month whose sheet is missing.
pub fn analyze_months(
    path: &Path,
    from: MonthLabel,
    to: MonthLabel,
    policy: CleanPolicy,
) -> Result<Vec<MonthAnalysis>> {
    let mut doc = open_document(path)?;
    let labels = from.through(to);
    debug!("Analysing {} months from {} to {}", labels.len(), from, to);
    labels
        .into_iter()
        .map(|label| analyze_month(doc.as_mut(), label, policy))
        .collect()
}

/// Month start through `today` for the current month, otherwise the whole
/// month.
pub fn default_range(label: MonthLabel, today: NaiveDate) -> DateRange {
    if label.contains(today) {
        DateRange {
            start: label.first_day(),
            end: today,
        }
    } else {
        DateRange::month(label)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
