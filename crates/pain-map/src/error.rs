//! Error types for mapping operations.

use pain_model::{CanonicalField, FieldKind, RecordPosition, SchemaVersion};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One canonical field that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingIssue {
    /// No synonym had a value and no default applies.
    Unresolved {
        record: RecordPosition,
        field: CanonicalField,
    },
    /// A value was found but is not a valid `expected`.
    InvalidValue {
        record: RecordPosition,
        field: CanonicalField,
        value: String,
        expected: FieldKind,
    },
}

impl MappingIssue {
    pub fn field(&self) -> CanonicalField {
        match self {
            Self::Unresolved { field, .. } | Self::InvalidValue { field, .. } => *field,
        }
    }

    pub fn record(&self) -> RecordPosition {
        match self {
            Self::Unresolved { record, .. } | Self::InvalidValue { record, .. } => *record,
        }
    }
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { record, field } => {
                write!(f, "{record}: no value for '{field}'")
            }
            Self::InvalidValue {
                record,
                field,
                value,
                expected,
            } => write!(f, "{record}: '{value}' is not a valid {expected} for '{field}'"),
        }
    }
}

/// Every canonical field that could not be resolved for a revision.
#[derive(Debug, Clone, Error)]
#[error("{} canonical field(s) could not be resolved for {version}", issues.len())]
pub struct MappingError {
    pub version: SchemaVersion,
    pub issues: Vec<MappingIssue>,
}

pub type Result<T> = std::result::Result<T, MappingError>;
