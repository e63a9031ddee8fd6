//! Error types for record loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading source records.
#[derive(Debug, Error)]
pub enum SourceError {
    // === Missing or unreadable sources ===
    /// Source file does not exist.
    #[error("source not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read source {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension does not name a supported source type.
    #[error("unsupported source type for {path}: expected .csv, .tsv, .txt, .db, .sqlite or .sqlite3")]
    UnsupportedSource { path: PathBuf },

    /// Relational table is missing from the database.
    #[error("table '{table}' not found in {path}")]
    TableNotFound { path: PathBuf, table: String },

    // === Content errors ===
    /// Source holds no column header at all.
    #[error("source is empty: {path}")]
    Empty { path: PathBuf },

    /// Malformed delimited data.
    #[error("failed to parse delimited file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// SQLite open or query failure.
    #[error("database error in {path}: {source}")]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

impl SourceError {
    /// True for the "empty source" class; everything else means the source
    /// could not be read.
    pub fn is_empty_source(&self) -> bool {
        matches!(self, SourceError::Empty { .. })
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::TableNotFound {
            path: PathBuf::from("payments.db"),
            table: "pain001".to_string(),
        };
        assert_eq!(err.to_string(), "table 'pain001' not found in payments.db");
        assert!(!err.is_empty_source());
        assert!(
            SourceError::Empty {
                path: PathBuf::from("a.csv")
            }
            .is_empty_source()
        );
    }
}
