//! Delimited text sources (CSV, TSV).

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use pain_model::RawRecord;

use crate::error::{Result, SourceError};
use crate::loader::RecordLoader;

/// Reads a delimited file whose first line names the columns.
///
/// Headers and values are trimmed. Short rows are padded with empty values
/// so every record carries every column.
#[derive(Debug, Clone)]
pub struct DelimitedFileLoader {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = default_delimiter(&path);
        Self { path, delimiter }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                SourceError::FileRead {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })
    }

    fn csv_error(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordLoader for DelimitedFileLoader {
    fn describe(&self) -> String {
        format!("delimited file {}", self.path.display())
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        let file = self.open()?;
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let name = if index == 0 {
                    name.trim_start_matches('\u{feff}')
                } else {
                    name
                };
                name.to_string()
            })
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(SourceError::Empty {
                path: self.path.clone(),
            });
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.csv_error(e))?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let record = RawRecord::from_pairs(
                headers
                    .iter()
                    .enumerate()
                    .map(|(index, name)| (name.clone(), row.get(index).unwrap_or_default())),
            );
            records.push(record);
        }

        debug!(
            path = %self.path.display(),
            columns = headers.len(),
            records = records.len(),
            "loaded delimited source"
        );
        Ok(records)
    }
}

fn default_delimiter(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv { b'\t' } else { b',' }
}
