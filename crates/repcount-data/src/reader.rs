//! Spreadsheet discovery and loading.
//!
//! Opens workbooks through [`calamine`] and CSV exports through [`csv`],
//! exposing both as a [`Document`]. [`load_month`] then locates the sheet for
//! one month and maps its header onto the five required columns.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use repcount_core::error::{RepError, Result};
use repcount_core::models::MonthLabel;
use repcount_core::source::{CellValue, Document, Table};
use tracing::{debug, warn};

/// Column names every month sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "time", "location", "exercise", "count"];

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ── Raw sheet model ───────────────────────────────────────────────────────────

/// One data row, with the five required cells picked out of the header order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based row number in the sheet, for messages.
    pub row: usize,
    pub location: CellValue,
    pub exercise: CellValue,
    pub date: CellValue,
    pub time: CellValue,
    pub count: CellValue,
}

/// A month sheet after header validation and before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub sheet: String,
    pub month: MonthLabel,
    /// Every non-blank header name, in sheet order, extraneous ones included.
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ── Workbook documents ────────────────────────────────────────────────────────

/// Excel or OpenDocument workbook read through calamine.
pub struct WorkbookDocument {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path)
            .map_err(|e| RepError::Workbook(format!("{}: {}", path.display(), e)))?;
        debug!("Opened workbook {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }
}

impl Document for WorkbookDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn sheet(&mut self, name: &str) -> Result<Table> {
        let available = self.sheet_names();
        if !available.iter().any(|s| s == name) {
            return Err(RepError::NotFound {
                sheet: name.to_string(),
                available,
            });
        }

        let range = self.workbook.worksheet_range(name).map_err(|e| {
            RepError::Workbook(format!("{} [{}]: {}", self.path.display(), name, e))
        })?;

        let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let cells = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();
        Ok(Table::new(name, cells).with_first_row(first_row))
    }
}

/// Map a calamine cell onto [`CellValue`].
fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match data.as_datetime() {
                // Serials below one day carry only a clock time.
                Some(ndt) if serial < 1.0 => CellValue::Time(ndt.time()),
                Some(ndt) if ndt.time() == NaiveTime::MIN => CellValue::Date(ndt.date()),
                Some(ndt) => CellValue::DateTime(ndt),
                None => CellValue::Float(serial),
            }
        }
        Data::DateTimeIso(s) => convert_iso(s),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
    }
}

/// OpenDocument stores dates and times as ISO-8601 text.
fn convert_iso(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return CellValue::Time(t);
    }
    CellValue::from_text(s)
}

// ── CSV documents ─────────────────────────────────────────────────────────────

/// CSV exports: one file per month, the file stem naming the sheet.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    sheets: Vec<(String, PathBuf)>,
}

impl CsvDocument {
    /// A single CSV file holding one sheet.
    pub fn from_file(path: &Path) -> Result<Self> {
        let name = sheet_name_for(path)?;
        Ok(Self {
            sheets: vec![(name, path.to_path_buf())],
        })
    }

    /// Every `*.csv` directly inside `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case("csv"))
                        .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();

        if files.is_empty() {
            warn!("No CSV files found in {}", dir.display());
        }

        let sheets = files
            .into_iter()
            .map(|p| sheet_name_for(&p).map(|name| (name, p)))
            .collect::<Result<Vec<_>>>()?;
        debug!("Found {} CSV sheets in {}", sheets.len(), dir.display());
        Ok(Self { sheets })
    }
}

impl Document for CsvDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sheet(&mut self, name: &str) -> Result<Table> {
        let Some((_, path)) = self.sheets.iter().find(|(n, _)| n == name) else {
            return Err(RepError::NotFound {
                sheet: name.to_string(),
                available: self.sheet_names(),
            });
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(path, e))?;
            cells.push(record.iter().map(CellValue::from_text).collect());
        }
        Ok(Table::new(name, cells))
    }
}

fn sheet_name_for(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| RepError::Format(format!("{} has no file name", path.display())))
}

fn csv_error(path: &Path, e: csv::Error) -> RepError {
    RepError::Workbook(format!("{}: {}", path.display(), e))
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open the document at `path`, choosing the reader by file type.
///
/// Directories are read as folders of CSV exports.
pub fn open_document(path: &Path) -> Result<Box<dyn Document>> {
    let metadata = std::fs::metadata(path).map_err(|source| RepError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_dir() {
        return Ok(Box::new(CsvDocument::from_dir(path)?));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvDocument::from_file(path)?)),
        e if WORKBOOK_EXTENSIONS.contains(&e) => Ok(Box::new(WorkbookDocument::open(path)?)),
        "numbers" => Err(RepError::Format(format!(
            "{}: Numbers documents cannot be read directly; export to .xlsx or .csv",
            path.display()
        ))),
        other => Err(RepError::Format(format!(
            "{}: unsupported file type \"{}\" (expected one of xlsx, xlsm, xlsb, xls, ods, csv)",
            path.display(),
            other
        ))),
    }
}

/// Load the sheet named after `label` and validate its header.
pub fn load_month(doc: &mut dyn Document, label: MonthLabel) -> Result<RawTable> {
    let table = doc.sheet(&label.to_string())?;
    parse_table(&table, label)
}

/// Month labels of every sheet whose name is a canonical label, oldest first.
pub fn month_sheets(doc: &dyn Document) -> Vec<MonthLabel> {
    let mut labels: Vec<MonthLabel> = doc
        .sheet_names()
        .iter()
        .filter_map(|name| {
            let label = name.parse::<MonthLabel>().ok()?;
            (label.to_string() == *name).then_some(label)
        })
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Locate the header, map required columns and collect non-empty rows.
fn parse_table(table: &Table, month: MonthLabel) -> Result<RawTable> {
    let header_idx = table
        .cells
        .iter()
        .position(|row| row.iter().any(|c| !c.is_empty()))
        .ok_or_else(|| RepError::Format(format!("sheet \"{}\" has no header row", table.name)))?;

    let header: Vec<String> = table.cells[header_idx]
        .iter()
        .map(|c| c.display().trim().to_string())
        .collect();

    let mut positions = [0usize; 5];
    let mut missing: Vec<&str> = Vec::new();
    for (slot, required) in REQUIRED_COLUMNS.iter().enumerate() {
        let found: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() == *required)
            .map(|(i, _)| i)
            .collect();
        match found.as_slice() {
            [] => missing.push(*required),
            [i] => positions[slot] = *i,
            _ => {
                return Err(RepError::Format(format!(
                    "sheet \"{}\" has more than one \"{}\" column",
                    table.name, required
                )))
            }
        }
    }
    if !missing.is_empty() {
        return Err(RepError::Format(format!(
            "sheet \"{}\" is missing required column(s): {}",
            table.name,
            missing.join(", ")
        )));
    }

    let columns: Vec<String> = header.iter().filter(|h| !h.is_empty()).cloned().collect();
    let extraneous: Vec<&str> = columns
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()))
        .map(String::as_str)
        .collect();
    if !extraneous.is_empty() {
        warn!(
            sheet = %table.name,
            "Extraneous column(s) present: {}",
            extraneous.join(", ")
        );
    }

    let cell = |row: &[CellValue], idx: usize| row.get(idx).cloned().unwrap_or(CellValue::Empty);
    let [date, time, location, exercise, count] = positions;

    let rows: Vec<RawRow> = table
        .cells
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .filter(|(_, row)| row.iter().any(|c| !c.is_empty()))
        .map(|(i, row)| RawRow {
            row: table.first_row + i,
            location: cell(row, location),
            exercise: cell(row, exercise),
            date: cell(row, date),
            time: cell(row, time),
            count: cell(row, count),
        })
        .collect();

    debug!(
        "Sheet {}: header at row {}, {} data rows",
        table.name,
        table.first_row + header_idx,
        rows.len()
    );

    Ok(RawTable {
        sheet: table.name.clone(),
        month,
        columns,
        rows,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_core::source::MemoryDocument;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn text(s: &str) -> CellValue {
        CellValue::from_text(s)
    }

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| text(c)).collect()
    }

    fn november() -> MonthLabel {
        MonthLabel::new(2024, 11).unwrap()
    }

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn doc_with(cells: Vec<Vec<CellValue>>) -> MemoryDocument {
        MemoryDocument::new(vec![Table::new("2024-November", cells)])
    }

    // ── load_month ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_month_maps_columns_in_any_order() {
        let mut doc = doc_with(vec![
            text_row(&["count", "exercise", "location", "time", "date"]),
            text_row(&["20", "pushups", "home", "07:30", "2024-11-01"]),
        ]);
        let raw = load_month(&mut doc, november()).unwrap();
        assert_eq!(raw.rows.len(), 1);
        let row = &raw.rows[0];
        assert_eq!(row.count, text("20"));
        assert_eq!(row.exercise, text("pushups"));
        assert_eq!(row.date, text("2024-11-01"));
        assert_eq!(row.row, 2);
    }

    #[test]
    fn test_load_month_missing_sheet_lists_available() {
        let mut doc = doc_with(vec![]);
        let err = load_month(&mut doc, MonthLabel::new(2024, 12).unwrap()).unwrap_err();
        match err {
            RepError::NotFound { sheet, available } => {
                assert_eq!(sheet, "2024-December");
                assert_eq!(available, vec!["2024-November"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_month_missing_column_is_format_error() {
        let mut doc = doc_with(vec![text_row(&["date", "time", "location", "exercise"])]);
        let err = load_month(&mut doc, november()).unwrap_err();
        assert!(matches!(&err, RepError::Format(msg) if msg.contains("count")));
    }

    #[test]
    fn test_load_month_header_names_are_case_sensitive() {
        let mut doc = doc_with(vec![
            text_row(&["Date", "TIME", "Location", "Exercise", "Count"]),
            text_row(&["2024-11-01", "07:30", "home", "pushups", "20"]),
        ]);
        let err = load_month(&mut doc, november()).unwrap_err();
        match err {
            RepError::Format(msg) => {
                assert!(msg.contains("date, time, location, exercise, count"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_month_trims_header_whitespace() {
        let mut doc = doc_with(vec![
            text_row(&[" date", "time ", "location", " exercise ", "count"]),
            text_row(&["2024-11-01", "07:30", "home", "pushups", "20"]),
        ]);
        let raw = load_month(&mut doc, november()).unwrap();
        assert_eq!(raw.rows.len(), 1);
        assert_eq!(raw.rows[0].exercise, text("pushups"));
    }

    #[test]
    fn test_load_month_duplicate_column_is_format_error() {
        let mut doc = doc_with(vec![text_row(&[
            "date", "time", "location", "exercise", "count", "count",
        ])]);
        assert!(matches!(
            load_month(&mut doc, november()),
            Err(RepError::Format(_))
        ));
    }

    #[test]
    fn test_load_month_keeps_extraneous_columns() {
        let mut doc = doc_with(vec![
            text_row(&["date", "time", "location", "exercise", "count", "notes"]),
            text_row(&["2024-11-01", "07:30", "home", "pushups", "20", "felt good"]),
        ]);
        let raw = load_month(&mut doc, november()).unwrap();
        assert_eq!(raw.columns.last().map(String::as_str), Some("notes"));
        assert_eq!(raw.rows.len(), 1);
    }

    #[test]
    fn test_load_month_skips_leading_and_empty_rows() {
        let mut doc = doc_with(vec![
            text_row(&["", ""]),
            text_row(&[" date ", "time", "location", "exercise", "count"]),
            text_row(&["2024-11-01", "07:30", "home", "pushups", "20"]),
            text_row(&["", "", "", "", ""]),
            text_row(&["", "08:00", "", "", "15"]),
        ]);
        let raw = load_month(&mut doc, november()).unwrap();
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[1].row, 5);
        assert_eq!(raw.rows[1].date, CellValue::Empty);
    }

    #[test]
    fn test_load_month_short_rows_pad_with_empty() {
        let mut doc = doc_with(vec![
            text_row(&["date", "time", "location", "exercise", "count"]),
            text_row(&["2024-11-01", "07:30"]),
        ]);
        let raw = load_month(&mut doc, november()).unwrap();
        assert_eq!(raw.rows[0].count, CellValue::Empty);
    }

    #[test]
    fn test_load_month_blank_sheet_has_no_header() {
        let mut doc = doc_with(vec![text_row(&["", " "])]);
        assert!(matches!(
            load_month(&mut doc, november()),
            Err(RepError::Format(_))
        ));
    }

    // ── month_sheets ──────────────────────────────────────────────────────────

    #[test]
    fn test_month_sheets_sorted_and_filtered() {
        let doc = MemoryDocument::new(vec![
            Table::new("2025-January", vec![]),
            Table::new("Summary", vec![]),
            Table::new("2024-November", vec![]),
            Table::new("2024-12", vec![]),
        ]);
        let labels = month_sheets(&doc);
        assert_eq!(
            labels,
            vec![november(), MonthLabel::new(2025, 1).unwrap()]
        );
    }

    // ── CSV documents ─────────────────────────────────────────────────────────

    #[test]
    fn test_csv_dir_document() {
        let tmp = TempDir::new().unwrap();
        write_csv(
            tmp.path(),
            "2024-November.csv",
            &[
                "date,time,location,exercise,count",
                "2024-11-01,07:30,home,pushups,20",
            ],
        );
        write_csv(tmp.path(), "2024-October.csv", &["date,time,location,exercise,count"]);
        write_csv(tmp.path(), "notes.txt", &["ignored"]);

        let mut doc = open_document(tmp.path()).unwrap();
        assert_eq!(doc.sheet_names(), vec!["2024-November", "2024-October"]);

        let raw = load_month(doc.as_mut(), november()).unwrap();
        assert_eq!(raw.rows.len(), 1);
        assert_eq!(raw.rows[0].location, text("home"));
    }

    #[test]
    fn test_csv_single_file_document() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(
            tmp.path(),
            "2024-November.csv",
            &["date,time,location,exercise,count", "2024-11-02,,gym,pullups,8"],
        );
        let mut doc = open_document(&path).unwrap();
        let raw = load_month(doc.as_mut(), november()).unwrap();
        assert_eq!(raw.rows[0].time, CellValue::Empty);
        assert_eq!(raw.rows[0].count, text("8"));
    }

    #[test]
    fn test_open_document_missing_path() {
        let tmp = TempDir::new().unwrap();
        let err = open_document(&tmp.path().join("absent.xlsx")).err().unwrap();
        assert!(matches!(err, RepError::FileRead { .. }));
    }

    #[test]
    fn test_open_document_rejects_numbers_and_unknown() {
        let tmp = TempDir::new().unwrap();
        let numbers = write_csv(tmp.path(), "log.numbers", &[""]);
        let other = write_csv(tmp.path(), "log.txt", &[""]);
        assert!(matches!(open_document(&numbers).err(), Some(RepError::Format(_))));
        assert!(matches!(open_document(&other).err(), Some(RepError::Format(_))));
    }

    #[test]
    fn test_open_document_corrupt_workbook() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(tmp.path(), "log.xlsx", &["not a zip archive"]);
        assert!(matches!(open_document(&path).err(), Some(RepError::Workbook(_))));
    }

    // ── Cell conversion ───────────────────────────────────────────────────────

    #[test]
    fn test_convert_plain_cells() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(
            convert_cell(&Data::String("  ".to_string())),
            CellValue::Empty
        );
    }

    #[test]
    fn test_convert_iso_cells() {
        assert_eq!(
            convert_iso("2024-11-05"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 11, 5).unwrap())
        );
        assert_eq!(
            convert_iso("07:30:00"),
            CellValue::Time(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
        assert_eq!(
            convert_iso("2024-11-05T07:30:00"),
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 11, 5)
                    .unwrap()
                    .and_hms_opt(7, 30, 0)
                    .unwrap()
            )
        );
    }
}
