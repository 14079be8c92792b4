//! Domain model for repcount.
//!
//! Month labels, cleaned exercise sets, statistics and projection
//! calculators, chart data, plain-text reports and CLI settings. Nothing in
//! this crate touches a spreadsheet file directly; see [`source::Document`].

pub mod calculations;
pub mod chart;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod report;
pub mod settings;
pub mod source;
pub mod time_utils;
