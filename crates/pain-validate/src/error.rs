//! Error types for record and schema validation.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use pain_model::ValidationReport;

use crate::record::FieldError;

/// The source held nothing a document could be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySourceError {
    #[error("source contains no records")]
    NoRecords,
    /// Only the header record was present.
    #[error("source contains a header record but no transaction records")]
    NoTransactions,
}

/// Every field problem found across all source records.
#[derive(Debug, Clone, Error)]
#[error("{} field error(s) found in source records", errors.len())]
pub struct FieldValidationError {
    pub errors: Vec<FieldError>,
}

/// Outcome of a failed record check.
#[derive(Debug, Clone, Error)]
pub enum RecordCheckError {
    #[error(transparent)]
    Empty(#[from] EmptySourceError),
    #[error(transparent)]
    Fields(#[from] FieldValidationError),
}

/// The schema resource could not be used to validate anything.
#[derive(Debug, Error)]
pub enum SchemaResourceError {
    /// Failed to read an override file.
    #[error("failed to read schema {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not well-formed XML, or not a schema document.
    #[error("schema {origin} is malformed: {message}")]
    Malformed { origin: String, message: String },

    /// Uses a schema construct outside the supported subset.
    #[error("schema {origin} uses unsupported construct: {construct}")]
    Unsupported { origin: String, construct: String },

    /// A type reference names no type in the schema.
    #[error("schema {origin} references undefined type '{name}'")]
    UnresolvedType { origin: String, name: String },

    /// A facet value cannot be interpreted.
    #[error("schema {origin} has invalid {facet} facet '{value}': {message}")]
    InvalidFacet {
        origin: String,
        facet: String,
        value: String,
        message: String,
    },
}

/// The document does not conform to its schema.
#[derive(Debug, Clone, Error)]
#[error("document failed schema validation with {} violation(s)", report.len())]
pub struct ValidationFailure {
    pub report: ValidationReport,
}
