//! Structured outcome of one run.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Serialize;

use pain_map::MappingIssue;
use pain_model::{AssemblyWarning, SchemaVersion, Violation};
use pain_validate::FieldError;

use crate::error::PipelineError;
use crate::stage::Stage;

/// What stopped a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Stage the run was trying to reach.
    pub stage: Stage,
    /// Stable error kind, see [`PipelineError::kind`].
    pub kind: String,
    pub message: String,
}

/// Result of a run, independent of how a caller presents it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Revision as requested.
    pub requested_version: String,
    /// Resolved revision; `None` when the request named no supported one.
    pub version: Option<SchemaVersion>,
    pub source: PathBuf,
    /// Last stage completed.
    pub stage: Stage,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_sum: Option<Decimal>,
    pub warnings: Vec<AssemblyWarning>,
    pub field_errors: Vec<FieldError>,
    pub mapping_issues: Vec<MappingIssue>,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(requested_version: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            requested_version: requested_version.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    pub(crate) fn reached(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Records `error` as the terminal outcome, keeping every problem it
    /// carries.
    pub fn fail(&mut self, error: &PipelineError) {
        match error {
            PipelineError::Fields(failure) => self.field_errors.clone_from(&failure.errors),
            PipelineError::Mapping(failure) => self.mapping_issues.clone_from(&failure.issues),
            PipelineError::Validation(failure) => {
                self.violations.clone_from(&failure.report.violations);
            }
            _ => {}
        }
        self.success = false;
        self.output_path = None;
        self.failure = Some(Failure {
            stage: error.stage(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }

    /// Number of individual problems reported.
    pub fn problem_count(&self) -> usize {
        self.field_errors.len() + self.mapping_issues.len() + self.violations.len()
    }
}
