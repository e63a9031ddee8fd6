//! Loader interface and source-type dispatch.

use std::path::Path;

use pain_model::RawRecord;

use crate::delimited::DelimitedFileLoader;
use crate::error::{Result, SourceError};
use crate::sqlite::SqliteTableLoader;

/// Table read from a database source when none is configured.
pub const DEFAULT_TABLE: &str = "pain001";

/// Produces the ordered records of one source.
///
/// The first record conventionally carries the batch header fields; the
/// caller decides how records split into header and transactions.
pub trait RecordLoader {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Vec<RawRecord>>;
}

/// Kind of source, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Delimited,
    Sqlite,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceKind::Delimited),
            "db" | "sqlite" | "sqlite3" => Ok(SourceKind::Sqlite),
            _ => Err(SourceError::UnsupportedSource {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Table name for database sources; sanitized before use.
    pub table: String,
    /// Field delimiter for delimited sources; inferred from the extension
    /// when `None`.
    pub delimiter: Option<u8>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            delimiter: None,
        }
    }
}

/// Picks the loader for `path` by extension.
pub fn open_loader(path: &Path, options: &LoaderOptions) -> Result<Box<dyn RecordLoader>> {
    match SourceKind::detect(path)? {
        SourceKind::Delimited => {
            let mut loader = DelimitedFileLoader::new(path);
            if let Some(delimiter) = options.delimiter {
                loader = loader.with_delimiter(delimiter);
            }
            Ok(Box::new(loader))
        }
        SourceKind::Sqlite => Ok(Box::new(SqliteTableLoader::new(path, &options.table))),
    }
}
