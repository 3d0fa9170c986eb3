//! Keystone test-report generation
//!
//! Turns the E2E results JSON plus captured screenshots into a paginated
//! PDF: title page with the suite summary, one section per feature with its
//! scenarios and step outcomes, embedded screenshots, and a sign-off page.

pub mod error;
pub mod pdf;
pub mod screenshot;

use std::path::Path;

use keystone_common::results::Feature;

pub use error::{Error, Result};

/// Load the results JSON. Unlike the coverage parser, a missing file here is
/// an error: no results means the tests never ran.
pub fn load_results(path: &Path) -> Result<Vec<Feature>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
