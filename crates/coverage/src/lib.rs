//! Coverage comment pipeline
//!
//! Parses one or more LCOV reports, aggregates per-file counters into
//! totals, renders a markdown comment, and publishes it (create-or-update)
//! on a pull request.

pub mod error;
pub mod github;
pub mod lcov;
pub mod markdown;

pub use error::{Error, Result};
pub use lcov::{parse_lcov, CoverageRecord, CoverageTotals, FileCoverage};
