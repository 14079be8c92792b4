//! Small line-level building blocks shared by the views.

pub mod header;
pub mod progress_bar;
