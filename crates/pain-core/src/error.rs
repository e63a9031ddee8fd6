//! Error type for a pipeline run.

use thiserror::Error;

use pain_ingest::SourceError;
use pain_map::MappingError;
use pain_model::UnsupportedVersionError;
use pain_output::{RenderError, WriteError};
use pain_standards::StandardsError;
use pain_validate::{
    EmptySourceError, FieldValidationError, RecordCheckError, SchemaResourceError,
    ValidationFailure,
};

use crate::stage::Stage;

/// Why a run stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    // === Configuration ===
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),

    #[error("failed to load revision standards: {0}")]
    Standards(#[from] StandardsError),

    #[error(transparent)]
    SchemaResource(#[from] SchemaResourceError),

    // === Source ===
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Empty(#[from] EmptySourceError),

    // === Accumulated validation problems ===
    #[error(transparent)]
    Fields(#[from] FieldValidationError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    // === Output ===
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),

    /// The cancellation token fired before `stage` could start.
    #[error("run cancelled before reaching the {stage} stage")]
    Cancelled { stage: Stage },
}

impl From<RecordCheckError> for PipelineError {
    fn from(error: RecordCheckError) -> Self {
        match error {
            RecordCheckError::Empty(error) => PipelineError::Empty(error),
            RecordCheckError::Fields(error) => PipelineError::Fields(error),
        }
    }
}

impl PipelineError {
    /// Stable snake-case name for reports and machine consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedVersion(_) => "unsupported_version",
            PipelineError::Standards(_) => "standards",
            PipelineError::SchemaResource(_) => "schema_resource",
            PipelineError::Source(error) if error.is_empty_source() => "empty_source",
            PipelineError::Source(_) => "source_unavailable",
            PipelineError::Empty(_) => "empty_source",
            PipelineError::Fields(_) => "field_validation",
            PipelineError::Mapping(_) => "mapping",
            PipelineError::Validation(_) => "validation_failure",
            PipelineError::Render(_) => "render",
            PipelineError::Write(_) => "write",
            PipelineError::Cancelled { .. } => "cancelled",
        }
    }

    /// The stage that could not be reached.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::UnsupportedVersion(_)
            | PipelineError::Standards(_)
            | PipelineError::SchemaResource(_) => Stage::Configured,
            PipelineError::Source(_) => Stage::Loaded,
            PipelineError::Empty(_) | PipelineError::Fields(_) => Stage::Validated,
            PipelineError::Mapping(_) => Stage::Mapped,
            PipelineError::Render(_) => Stage::Serialized,
            PipelineError::Validation(_) => Stage::SchemaChecked,
            PipelineError::Write(_) => Stage::Done,
            PipelineError::Cancelled { stage } => *stage,
        }
    }

    /// True for problems in the input data, as opposed to a resource or
    /// configuration that could not be used at all.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Empty(_)
                | PipelineError::Fields(_)
                | PipelineError::Mapping(_)
                | PipelineError::Validation(_)
        ) || matches!(self, PipelineError::Source(error) if error.is_empty_source())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn kinds_and_stages() {
        let error = PipelineError::from(SourceError::NotFound {
            path: PathBuf::from("missing.csv"),
        });
        assert_eq!(error.kind(), "source_unavailable");
        assert_eq!(error.stage(), Stage::Loaded);
        assert!(!error.is_data_error());

        let error = PipelineError::from(RecordCheckError::from(EmptySourceError::NoTransactions));
        assert_eq!(error.kind(), "empty_source");
        assert_eq!(error.stage(), Stage::Validated);
        assert!(error.is_data_error());

        let error = PipelineError::Cancelled {
            stage: Stage::Mapped,
        };
        assert_eq!(error.to_string(), "run cancelled before reaching the mapped stage");
        assert_eq!(error.stage(), Stage::Mapped);
    }

    #[test]
    fn unreadable_empty_file_counts_as_empty_source() {
        let error = PipelineError::from(SourceError::Empty {
            path: PathBuf::from("blank.csv"),
        });
        assert_eq!(error.kind(), "empty_source");
        assert!(error.is_data_error());
    }
}
