//! cukehtml: static HTML report bundles for Cucumber-style test runs
//!
//! The crate turns the event stream of a BDD run into a self-contained report
//! directory: a `report.json` result document, one file per embedded
//! attachment, and a small single-page viewer copied from a bundled asset set.

pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod reporter;

pub use error::{ReportError, Result};
pub use events::RunEvent;
pub use reporter::{HtmlReportWriter, ReportOptions};

use serde::{Deserialize, Serialize};

/// A feature file and every scenario run from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Kind of a feature element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[default]
    Scenario,
    Background,
}

/// A scenario (or background) with its hooks and steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub line: usize,
    #[serde(rename = "type", default)]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<Hook>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<Hook>,
}

impl Element {
    /// Overall status: the most severe status among hooks and steps
    pub fn status(&self) -> Status {
        self.before
            .iter()
            .filter_map(|h| h.result.as_ref())
            .chain(self.steps.iter().filter_map(|s| s.result.as_ref()))
            .chain(self.after.iter().filter_map(|h| h.result.as_ref()))
            .map(|r| r.status)
            .max_by_key(|s| s.severity())
            .unwrap_or(Status::Passed)
    }
}

/// A single Gherkin step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line: usize,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub step_match: Option<Match>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<String>,
}

/// A before/after hook execution attached to an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub hook_match: Option<Match>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<String>,
}

/// Step definition a step or hook was matched against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
}

/// A captured step argument
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub val: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Outcome of a step or hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub status: Status,
    /// Duration in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StepResult {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            duration: None,
            error_message: None,
        }
    }
}

/// Step status as reported by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Pending,
    Undefined,
    Ambiguous,
}

impl Status {
    /// All statuses, in display order
    pub const ALL: [Status; 6] = [
        Status::Passed,
        Status::Failed,
        Status::Skipped,
        Status::Pending,
        Status::Undefined,
        Status::Ambiguous,
    ];

    /// Rank used to fold step statuses into a scenario status
    pub fn severity(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Skipped => 1,
            Status::Pending => 2,
            Status::Undefined => 3,
            Status::Ambiguous => 4,
            Status::Failed => 5,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Passed => write!(f, "passed"),
            Status::Failed => write!(f, "failed"),
            Status::Skipped => write!(f, "skipped"),
            Status::Pending => write!(f, "pending"),
            Status::Undefined => write!(f, "undefined"),
            Status::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Attachment reference. `data` holds the file name inside the report
/// directory for documents written by this crate, or a base64 payload in
/// documents produced elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub mime_type: String,
    pub data: String,
}

/// A Gherkin tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub line: usize,
}

/// Per-status counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    pub undefined: usize,
    pub ambiguous: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Pending => self.pending += 1,
            Status::Undefined => self.undefined += 1,
            Status::Ambiguous => self.ambiguous += 1,
        }
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Passed => self.passed,
            Status::Failed => self.failed,
            Status::Skipped => self.skipped,
            Status::Pending => self.pending,
            Status::Undefined => self.undefined,
            Status::Ambiguous => self.ambiguous,
        }
    }

    pub fn total(&self) -> usize {
        Status::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Aggregate numbers for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub features: usize,
    pub scenarios: StatusCounts,
    pub steps: StatusCounts,
    /// Attachments written as `embedded<N>.<ext>` files
    pub attachments: usize,
    /// Sum of step and hook durations in nanoseconds
    pub duration_nanos: u64,
    /// RFC 3339 timestamp of report generation
    pub generated_at: String,
}

impl RunSummary {
    /// Compute a summary over a result document
    pub fn from_features(features: &[Feature], attachments: usize) -> Self {
        let mut summary = RunSummary {
            features: features.len(),
            attachments,
            generated_at: chrono::Utc::now().to_rfc3339(),
            ..RunSummary::default()
        };

        for element in features.iter().flat_map(|f| f.elements.iter()) {
            if element.element_type == ElementType::Scenario {
                summary.scenarios.add(element.status());
            }
            for step in &element.steps {
                if let Some(ref result) = step.result {
                    summary.steps.add(result.status);
                    summary.duration_nanos += result.duration.unwrap_or(0);
                }
            }
            for hook in element.before.iter().chain(element.after.iter()) {
                if let Some(ref result) = hook.result {
                    summary.duration_nanos += result.duration.unwrap_or(0);
                }
            }
        }

        summary
    }

    /// True when no scenario ended in a non-passing state
    pub fn is_success(&self) -> bool {
        self.scenarios.total() == self.scenarios.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(status: Status, nanos: u64) -> Step {
        Step {
            keyword: "Given ".to_string(),
            name: "something".to_string(),
            line: 3,
            result: Some(StepResult {
                status,
                duration: Some(nanos),
                error_message: None,
            }),
            ..Step::default()
        }
    }

    #[test]
    fn test_element_status_takes_most_severe() {
        let element = Element {
            steps: vec![
                step(Status::Passed, 1),
                step(Status::Failed, 1),
                step(Status::Skipped, 1),
            ],
            ..Element::default()
        };
        assert_eq!(element.status(), Status::Failed);
    }

    #[test]
    fn test_element_status_counts_failing_hook() {
        let element = Element {
            steps: vec![step(Status::Passed, 1)],
            after: vec![Hook {
                result: Some(StepResult::new(Status::Failed)),
                ..Hook::default()
            }],
            ..Element::default()
        };
        assert_eq!(element.status(), Status::Failed);
    }

    #[test]
    fn test_empty_element_is_passed() {
        assert_eq!(Element::default().status(), Status::Passed);
    }

    #[test]
    fn test_summary_skips_backgrounds_in_scenario_count() {
        let feature = Feature {
            name: "Login".to_string(),
            elements: vec![
                Element {
                    element_type: ElementType::Background,
                    steps: vec![step(Status::Passed, 10)],
                    ..Element::default()
                },
                Element {
                    steps: vec![step(Status::Passed, 20), step(Status::Undefined, 0)],
                    ..Element::default()
                },
            ],
            ..Feature::default()
        };

        let summary = RunSummary::from_features(&[feature], 2);
        assert_eq!(summary.features, 1);
        assert_eq!(summary.scenarios.total(), 1);
        assert_eq!(summary.scenarios.undefined, 1);
        assert_eq!(summary.steps.passed, 2);
        assert_eq!(summary.steps.undefined, 1);
        assert_eq!(summary.duration_nanos, 30);
        assert_eq!(summary.attachments, 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&Status::Undefined).unwrap();
        assert_eq!(json, "\"undefined\"");
        assert!(serde_json::from_str::<Status>("\"exploded\"").is_err());
    }

    #[test]
    fn test_step_serializes_match_key() {
        let s = Step {
            step_match: Some(Match {
                location: Some("steps.rs:12".to_string()),
                arguments: vec![],
            }),
            ..Step::default()
        };
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["match"]["location"], "steps.rs:12");
        assert!(value.get("embeddings").is_none());
    }
}
