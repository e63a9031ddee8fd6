//! Run configuration.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use pain_ingest::{DEFAULT_TABLE, LoaderOptions};
use pain_model::{DEFAULT_PARALLEL_THRESHOLD, RecordLayout};

use crate::cancel::CancellationToken;

/// Everything one pipeline run needs.
///
/// The revision stays a string so that an unsupported one is reported by
/// the run itself, before any resource is touched.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Revision as given, e.g. `"pain.001.001.03"` or `"03"`.
    pub version: String,
    /// Delimited file or SQLite database to read.
    pub data_path: PathBuf,
    /// Schema definition replacing the embedded one.
    pub xsd_path: Option<PathBuf>,
    /// Directory for the artifact; the source's directory when `None`.
    pub output_dir: Option<PathBuf>,
    /// Table read from database sources. Sanitized before use.
    pub table: String,
    pub delimiter: Option<u8>,
    pub layout: RecordLayout,
    /// Used for `CreDtTm` when the source has no creation time.
    pub generated_at: DateTime<Utc>,
    /// Batches with more transactions than this are checked and mapped in
    /// parallel.
    pub parallel_threshold: usize,
    pub cancellation: Option<CancellationToken>,
}

impl RunConfig {
    pub fn new(version: impl Into<String>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            data_path: data_path.into(),
            xsd_path: None,
            output_dir: None,
            table: DEFAULT_TABLE.to_string(),
            delimiter: None,
            layout: RecordLayout::default(),
            generated_at: Utc::now(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_xsd(mut self, path: impl Into<PathBuf>) -> Self {
        self.xsd_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Fixes the generation timestamp, which makes runs reproducible.
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            table: self.table.clone(),
            delimiter: self.delimiter,
        }
    }

    /// Directory the artifact is written to.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .data_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
