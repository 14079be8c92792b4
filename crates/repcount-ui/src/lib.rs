//! Terminal UI and chart output for repcount.
//!
//! Provides themes, progress bars, the header component, report, sets table
//! and chart views built on [`ratatui`], the event loop that shows them, and
//! an SVG renderer built on plotters.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod report_view;
pub mod svg_chart;
pub mod table_view;
pub mod themes;

pub use repcount_core as core;
