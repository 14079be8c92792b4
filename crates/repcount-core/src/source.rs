//! The narrow interface between the pipeline and whatever parses spreadsheets.
//!
//! A [`Document`] is a set of named sheets; each sheet yields a [`Table`] of
//! raw [`CellValue`] rows. Concrete documents (workbooks, CSV folders) live in
//! `repcount-data`; tests build tables in memory.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::Result;

/// The value of one spreadsheet cell before any cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// A formula error or other unreadable cell, with its display text.
    Error(String),
}

impl CellValue {
    /// Treat blank and whitespace-only text as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Build a cell from free text, mapping blanks to [`CellValue::Empty`].
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// Text rendering used in warnings and for text columns.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
            CellValue::Error(e) => format!("#{}", e),
        }
    }
}

/// One sheet's cells, row-major, exactly as the document stores them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    /// 1-based sheet row number of `cells[0]`.
    pub first_row: usize,
    pub cells: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, cells: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            first_row: 1,
            cells,
        }
    }

    /// Used when the document trims leading blank rows from a sheet.
    pub fn with_first_row(mut self, first_row: usize) -> Self {
        self.first_row = first_row;
        self
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.cells.iter().map(|r| r.as_slice())
    }
}

/// A spreadsheet document holding one sheet per month.
pub trait Document {
    /// Names of every sheet, in document order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read the named sheet. Fails with [`crate::error::RepError::NotFound`]
    /// when no sheet has that name.
    fn sheet(&mut self, name: &str) -> Result<Table>;
}

/// In-memory document, used by tests and by callers that already hold tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    tables: Vec<Table>,
}

impl MemoryDocument {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }
}

impl Document for MemoryDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    fn sheet(&mut self, name: &str) -> Result<Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| crate::error::RepError::NotFound {
                sheet: name.to_string(),
                available: self.sheet_names(),
            })
    }
}
