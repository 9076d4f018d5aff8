//! Reporting utilities: curve tables, stress orientations, run summaries.

pub mod format;

pub use format::*;
