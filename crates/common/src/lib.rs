//! Keystone Common Library
//!
//! Shared types and utilities for the Keystone CI tooling: the
//! behave-compatible test-results model consumed by the report generator and
//! produced by the E2E harness, and the filename sanitization rule shared by
//! screenshot capture and lookup.

pub mod results;
pub mod sanitize;

// Re-export commonly used types
pub use results::{Feature, Scenario, Step, StepOutcome, StepStatus, SuiteSummary};
pub use sanitize::{sanitize_filename, screenshot_stem};

/// Keystone version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
