//! Screenshot lookup for report embedding

use std::path::{Path, PathBuf};

use keystone_common::sanitize::screenshot_stem;

/// Probe order for capture formats
const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Find the screenshot captured for a step, if any.
///
/// The stem comes from the shared sanitizer, so lookup names always match
/// what the harness wrote. A miss is not an error; the report simply omits
/// the image.
pub fn find_screenshot(dir: &Path, scenario: &str, keyword: &str, step: &str) -> Option<PathBuf> {
    let stem = screenshot_stem(scenario, keyword, step);
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.exists())
}
