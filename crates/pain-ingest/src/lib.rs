//! Source record loading.
//!
//! Turns a delimited file or a relational table into an ordered sequence of
//! [`RawRecord`](pain_model::RawRecord)s. No type coercion happens here: every
//! value comes back as the text the source holds.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pain_ingest::{LoaderOptions, open_loader};
//!
//! let loader = open_loader(Path::new("payments.csv"), &LoaderOptions::default())?;
//! let records = loader.load()?;
//! ```

mod delimited;
mod error;
mod loader;
mod sanitize;
mod sqlite;

// === Error Types ===
pub use error::{Result, SourceError};

// === Loaders ===
pub use delimited::DelimitedFileLoader;
pub use loader::{DEFAULT_TABLE, LoaderOptions, RecordLoader, SourceKind, open_loader};
pub use sqlite::{RowOrder, SqliteTableLoader};

// === Identifiers ===
pub use sanitize::sanitize_table_name;
