// crates/twincheck-validator/src/report.rs
// ============================================================================
// Module: Suite Report
// Description: Per-case outcomes and deterministic report artifacts.
// Purpose: Persist suite results as canonical JSON and markdown.
// Dependencies: serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! [`SuiteReport`] aggregates [`CaseOutcome`]s. Reports and transcripts are
//! written with canonical JSON (JCS) so repeated runs against the same server
//! produce byte-comparable artifacts, apart from durations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::client::TranscriptEntry;
use crate::suite::ServiceSelection;
use crate::suite::SuiteCase;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the JSON report.
pub const REPORT_JSON: &str = "report.json";
/// File name of the markdown report.
pub const REPORT_MARKDOWN: &str = "report.md";
/// File name of the request transcript.
pub const TRANSCRIPT_JSON: &str = "transcript.json";

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Pass/fail status of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every assertion held.
    Passed,
    /// An assertion failed.
    Failed,
}

impl CaseStatus {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Result of one suite case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    /// Case name.
    pub name: String,
    /// Case parameters.
    pub case: SuiteCase,
    /// Pass/fail status.
    pub status: CaseStatus,
    /// Pass summary or failure message.
    pub message: String,
    /// JSON path of the failure, when applicable.
    pub path: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Aggregated suite results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Services covered.
    pub selection: ServiceSelection,
    /// Number of cases run.
    pub total: usize,
    /// Number of passed cases.
    pub passed: usize,
    /// Number of failed cases.
    pub failed: usize,
    /// Outcomes in execution order.
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Builds a report and its totals.
    #[must_use]
    pub fn new(selection: ServiceSelection, outcomes: Vec<CaseOutcome>) -> Self {
        let passed =
            outcomes.iter().filter(|outcome| outcome.status == CaseStatus::Passed).count();
        Self {
            selection,
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    /// Returns true when no case failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.status == CaseStatus::Failed)
    }

    /// Returns the outcome for a case name.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// Serializes the report as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] when serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, ReportError> {
        serde_jcs::to_vec(self).map_err(|err| ReportError::Serialize(err.to_string()))
    }

    /// Renders a markdown summary.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Contract Suite Report\n\n");
        out.push_str("## Totals\n\n");
        out.push_str(&format!("- Services: {}\n", self.selection.as_str()));
        out.push_str(&format!("- Cases: {}\n", self.total));
        out.push_str(&format!("- Passed: {}\n", self.passed));
        out.push_str(&format!("- Failed: {}\n", self.failed));
        out.push_str("\n## Failures\n\n");
        if self.is_success() {
            out.push_str("- None\n");
        } else {
            for outcome in self.failures() {
                out.push_str(&format!("- `{}`: {}\n", outcome.name, outcome.message));
            }
        }
        out.push_str("\n## Cases\n\n");
        out.push_str("| Case | Status | Duration (ms) | Detail |\n");
        out.push_str("|------|--------|---------------|--------|\n");
        for outcome in &self.outcomes {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                outcome.name,
                outcome.status.as_str(),
                outcome.duration_ms,
                outcome.message.replace('|', "\\|")
            ));
        }
        out
    }

    /// Writes `report.json` and `report.md` into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or file I/O fails.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(dir).map_err(|err| ReportError::Io(err.to_string()))?;
        let json_path = dir.join(REPORT_JSON);
        fs::write(&json_path, self.to_canonical_json()?)
            .map_err(|err| ReportError::Io(err.to_string()))?;
        let markdown_path = dir.join(REPORT_MARKDOWN);
        fs::write(&markdown_path, self.render_markdown())
            .map_err(|err| ReportError::Io(err.to_string()))?;
        Ok(vec![json_path, markdown_path])
    }
}

/// Writes a session transcript as canonical JSON into `dir`.
///
/// # Errors
///
/// Returns [`ReportError`] when serialization or file I/O fails.
pub fn write_transcript(dir: &Path, entries: &[TranscriptEntry]) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|err| ReportError::Io(err.to_string()))?;
    let path = dir.join(TRANSCRIPT_JSON);
    let bytes =
        serde_jcs::to_vec(entries).map_err(|err| ReportError::Serialize(err.to_string()))?;
    fs::write(&path, bytes).map_err(|err| ReportError::Io(err.to_string()))?;
    Ok(path)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report persistence errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Serialization failure.
    #[error("report serialization failed: {0}")]
    Serialize(String),
    /// File system failure.
    #[error("report io error: {0}")]
    Io(String),
}
