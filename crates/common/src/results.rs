//! Test-results data model
//!
//! Mirrors the behave JSON report shape: an array of features, each holding
//! scenarios, each holding ordered steps with a keyword, a name, and an
//! optional result. The E2E harness writes this shape and the report
//! generator reads it back, so the types live here rather than in either
//! pipeline crate.

use serde::{Deserialize, Deserializer, Serialize};

/// A feature: a named group of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,

    /// Free-text description. Behave emits either a string or a list of
    /// lines; both deserialize to a single space-joined string.
    #[serde(default, deserialize_with = "de_description")]
    pub description: String,

    /// Scenarios, in document order (behave calls these "elements")
    #[serde(default)]
    pub elements: Vec<Scenario>,
}

/// A scenario: a named, ordered list of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default, deserialize_with = "de_description")]
    pub description: String,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// A scenario passes only when every one of its steps passed.
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status() == StepStatus::Passed)
    }
}

/// A single Given/When/Then step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Gherkin keyword: Given, When, Then, And
    pub keyword: String,

    pub name: String,

    /// Missing when the step never ran (an earlier step failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepOutcome>,
}

impl Step {
    /// Effective status; a step without a result is treated as skipped.
    pub fn status(&self) -> StepStatus {
        self.result
            .as_ref()
            .map(|r| r.status)
            .unwrap_or(StepStatus::Skipped)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.result.as_ref()?.error_message.as_deref()
    }
}

/// Outcome of an executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Step status as reported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
    /// Any status string this tooling does not know about
    #[serde(other)]
    Unknown,
}

/// Scenario counts across a whole results file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl SuiteSummary {
    pub fn of(features: &[Feature]) -> Self {
        let mut summary = Self::default();
        for scenario in features.iter().flat_map(|f| &f.elements) {
            summary.total += 1;
            if scenario.passed() {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Percentage of passed scenarios, or None for an empty suite.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.passed as f64 / self.total as f64 * 100.0)
    }
}

fn de_description<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => String::new(),
        Some(Raw::One(s)) => s,
        Some(Raw::Many(lines)) => lines.join(" "),
    })
}
