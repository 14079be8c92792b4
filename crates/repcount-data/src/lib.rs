//! Data ingestion layer for repcount.
//!
//! Opens spreadsheet documents, validates month sheets, cleans their rows
//! into [`repcount_core::models::MonthTable`]s and aggregates them per day
//! for the charts.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod reader;

pub use repcount_core as core;
