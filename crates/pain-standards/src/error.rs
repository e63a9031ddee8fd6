//! Error types for standards loading.

use pain_model::SchemaVersion;
use thiserror::Error;

/// Errors raised while parsing the embedded tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Failed to parse a CSV table.
    #[error("failed to parse {file}: {message}")]
    CsvParse { file: String, message: String },

    /// Invalid value in a table cell.
    #[error("invalid {field} value '{value}' in {file}")]
    InvalidValue {
        field: &'static str,
        value: String,
        file: String,
    },

    /// A canonical field appears twice in one mapping table.
    #[error("field '{field}' is mapped more than once in {file}")]
    DuplicateField { field: String, file: String },

    /// A field is used in a section that cannot supply it.
    #[error("field '{field}' cannot be emitted in the {section} section of {file}")]
    ScopeMismatch {
        field: String,
        section: String,
        file: String,
    },

    /// No descriptor exists for a revision.
    #[error("no descriptor registered for {version}")]
    MissingVersion { version: SchemaVersion },
}

/// Result type for standards loading.
pub type Result<T> = std::result::Result<T, StandardsError>;
