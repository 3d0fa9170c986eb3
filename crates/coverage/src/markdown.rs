//! Markdown rendering of the coverage comment

use std::path::Path;

use crate::lcov::{CoverageTotals, FileCoverage};

/// Heading that identifies the bot comment so repeated runs update it
/// instead of stacking new ones.
pub const COMMENT_MARKER: &str = "## Code Coverage Report";

/// Render the full comment body: combined totals first, then one section per
/// coverage track with its own total line and per-file table.
pub fn format_comment(backend: &FileCoverage, frontend: &FileCoverage) -> String {
    let backend_totals = CoverageTotals::of(backend.values());
    let frontend_totals = CoverageTotals::of(frontend.values());

    // Merge for the overall table; a path present in both tracks counts once
    let mut combined = backend.clone();
    combined.extend(frontend.clone());
    let overall = CoverageTotals::of(combined.values());

    let mut out = String::new();
    out.push_str(COMMENT_MARKER);
    out.push_str("\n\n### Total\n\n");
    out.push_str("| Lines | Functions | Branches |\n");
    out.push_str("|-------|-----------|----------|\n");
    out.push_str(&format!(
        "| {:.2}% | {:.2}% | {:.2}% |\n\n",
        overall.line_pct(),
        overall.func_pct(),
        overall.branch_pct()
    ));

    render_group(&mut out, "Backend", backend, &backend_totals);
    render_group(&mut out, "Frontend", frontend, &frontend_totals);

    out
}

fn render_group(out: &mut String, title: &str, files: &FileCoverage, totals: &CoverageTotals) {
    out.push_str(&format!("### {}\n\n", title));
    out.push_str(&format!(
        "**Total:** {:.2}% lines | {:.2}% functions | {:.2}% branches\n\n",
        totals.line_pct(),
        totals.func_pct(),
        totals.branch_pct()
    ));

    if files.is_empty() {
        return;
    }

    out.push_str("| File | Lines | Functions | Branches |\n");
    out.push_str("|------|-------|-----------|----------|\n");
    // FileCoverage is a BTreeMap, so iteration is already sorted by path
    for (path, record) in files {
        let basename = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        out.push_str(&format!(
            "| {} | {:.2}% | {:.2}% | {:.2}% |\n",
            basename,
            record.line_pct(),
            record.func_pct(),
            record.branch_pct()
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcov::parse_lcov_str;

    fn backend() -> FileCoverage {
        parse_lcov_str(
            "SF:backend/src/main.rs\nLF:10\nLH:8\nFNF:2\nFNH:2\nBRF:4\nBRH:2\nend_of_record\n\
             SF:backend/src/api.rs\nLF:20\nLH:10\nend_of_record\n",
        )
        .unwrap()
    }

    #[test]
    fn test_marker_leads_the_comment() {
        let comment = format_comment(&backend(), &FileCoverage::new());
        assert!(comment.starts_with(COMMENT_MARKER));
    }

    #[test]
    fn test_file_rows_show_basenames_sorted() {
        let comment = format_comment(&backend(), &FileCoverage::new());
        let api = comment.find("| api.rs |").expect("api.rs row");
        let main = comment.find("| main.rs |").expect("main.rs row");
        assert!(api < main, "rows must be sorted by path");
        assert!(!comment.contains("backend/src"));
    }

    #[test]
    fn test_empty_group_has_total_but_no_table() {
        let comment = format_comment(&backend(), &FileCoverage::new());
        let frontend_section = &comment[comment.find("### Frontend").unwrap()..];
        assert!(frontend_section.contains("**Total:** 0.00% lines"));
        assert!(!frontend_section.contains("| File |"));
    }

    #[test]
    fn test_overall_combines_both_groups() {
        let frontend =
            parse_lcov_str("SF:frontend/src/app.ts\nLF:10\nLH:2\nend_of_record\n").unwrap();
        let comment = format_comment(&backend(), &frontend);
        // lines: (8 + 10 + 2) / (10 + 20 + 10) = 50.00%
        let total_section = &comment[..comment.find("### Backend").unwrap()];
        assert!(total_section.contains("| 50.00% |"), "{total_section}");
    }

    #[test]
    fn test_percentages_use_two_decimals() {
        let files = parse_lcov_str("SF:a.rs\nLF:3\nLH:1\nend_of_record\n").unwrap();
        let comment = format_comment(&files, &FileCoverage::new());
        assert!(comment.contains("33.33%"));
    }
}
