//! LCOV report parsing and aggregation
//!
//! LCOV is a line-prefixed text format: an `SF:` line opens a record for one
//! source file, counter lines (`LF:`, `LH:`, `FNF:`, `FNH:`, `BRF:`, `BRH:`)
//! accumulate into it, and `end_of_record` commits it. Anything else
//! (function names, per-line hits) is ignored here since only the summary
//! counters feed the comment.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Coverage counters for one source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    pub lines_found: u64,
    pub lines_hit: u64,
    pub funcs_found: u64,
    pub funcs_hit: u64,
    pub branches_found: u64,
    pub branches_hit: u64,
}

impl CoverageRecord {
    pub fn line_pct(&self) -> f64 {
        pct(self.lines_hit, self.lines_found)
    }

    pub fn func_pct(&self) -> f64 {
        pct(self.funcs_hit, self.funcs_found)
    }

    pub fn branch_pct(&self) -> f64 {
        pct(self.branches_hit, self.branches_found)
    }
}

/// Aggregate counters across a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub lines_found: u64,
    pub lines_hit: u64,
    pub funcs_found: u64,
    pub funcs_hit: u64,
    pub branches_found: u64,
    pub branches_hit: u64,
}

impl CoverageTotals {
    /// Sum each counter across the records. Commutative, so the result is
    /// independent of iteration order.
    pub fn of<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CoverageRecord>,
    {
        let mut totals = Self::default();
        for r in records {
            totals.lines_found += r.lines_found;
            totals.lines_hit += r.lines_hit;
            totals.funcs_found += r.funcs_found;
            totals.funcs_hit += r.funcs_hit;
            totals.branches_found += r.branches_found;
            totals.branches_hit += r.branches_hit;
        }
        totals
    }

    pub fn line_pct(&self) -> f64 {
        pct(self.lines_hit, self.lines_found)
    }

    pub fn func_pct(&self) -> f64 {
        pct(self.funcs_hit, self.funcs_found)
    }

    pub fn branch_pct(&self) -> f64 {
        pct(self.branches_hit, self.branches_found)
    }
}

/// Percentage with a divide-by-zero guard: 0 when nothing was found.
fn pct(hit: u64, found: u64) -> f64 {
    if found == 0 {
        0.0
    } else {
        hit as f64 / found as f64 * 100.0
    }
}

/// Per-file coverage keyed by source path. BTreeMap keeps iteration
/// lexicographic, which the markdown formatter relies on.
pub type FileCoverage = BTreeMap<String, CoverageRecord>;

/// Parse an LCOV file into per-file records.
///
/// A missing file yields an empty mapping: a coverage track that produced no
/// report is a legitimate partial run, not an error.
pub fn parse_lcov(path: &Path) -> Result<FileCoverage> {
    if !path.exists() {
        return Ok(FileCoverage::new());
    }
    let content = std::fs::read_to_string(path)?;
    parse_lcov_str(&content)
}

/// Parse LCOV text. Malformed counter values are fatal; there is no
/// partial-record recovery.
pub fn parse_lcov_str(content: &str) -> Result<FileCoverage> {
    let mut files = FileCoverage::new();
    let mut current: Option<String> = None;
    let mut record = CoverageRecord::default();

    for line in content.lines() {
        let line = line.trim_end();
        if let Some(path) = line.strip_prefix("SF:") {
            current = Some(path.to_string());
            record = CoverageRecord::default();
        } else if let Some(v) = line.strip_prefix("LF:") {
            record.lines_found = parse_count(line, v)?;
        } else if let Some(v) = line.strip_prefix("LH:") {
            record.lines_hit = parse_count(line, v)?;
        } else if let Some(v) = line.strip_prefix("FNF:") {
            record.funcs_found = parse_count(line, v)?;
        } else if let Some(v) = line.strip_prefix("FNH:") {
            record.funcs_hit = parse_count(line, v)?;
        } else if let Some(v) = line.strip_prefix("BRF:") {
            record.branches_found = parse_count(line, v)?;
        } else if let Some(v) = line.strip_prefix("BRH:") {
            record.branches_hit = parse_count(line, v)?;
        } else if line == "end_of_record" {
            if let Some(path) = current.take() {
                files.insert(path, record);
            }
            record = CoverageRecord::default();
        }
        // Unrecognized prefixes (DA:, FN:, BRDA:, ...) are ignored
    }

    Ok(files)
}

fn parse_count(line: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|source| Error::Malformed {
        line: line.to_string(),
        source,
    })
}
