//! # aigrade
//!
//! Grades Java submissions by asking a language model for a score and then
//! taking off deterministic style deductions.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Configuration built once at startup
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// For all things related to grading
pub mod grade;
/// For reading Java submissions and checking their style
pub mod java;
/// For all parsers used
pub mod parsers;
/// Utility functions for convenience
pub mod util;

pub use config::GraderConfig;
pub use grade::{BatchOutcome, GradeRecord, GradingJob, GradingResponse};
