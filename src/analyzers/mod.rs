//! Attendance aggregation and cohort selection.
//!
//! This module tallies names across sign-in rows, accumulates category and
//! month weighted scores for classified gatherings, and derives the summary
//! tables: people totals, potential and heavy cohorts, and the category and
//! monthly breakdowns.

pub mod aggregate;
pub mod analyzer;
pub mod breakdown;
pub mod cohort;
pub mod types;
pub mod utility;

pub use analyzer::compute_statistics;
pub use types::{AttendanceRow, StatisticsReport};
