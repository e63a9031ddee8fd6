//! Canonical data model shared by every stage of the pain.001 pipeline.
//!
//! Raw records come in exactly as the loader read them; the mapper turns
//! them into a [`CanonicalHeader`] plus ordered [`CanonicalTransaction`]s,
//! which carry no knowledge of any schema revision. Version-specific
//! behavior is keyed by [`SchemaVersion`].

pub mod canonical;
pub mod datetime;
pub mod document;
pub mod error;
pub mod field;
pub mod layout;
pub mod parallel;
pub mod record;
pub mod report;
pub mod version;

pub use canonical::{CanonicalHeader, CanonicalTransaction, Party, PostalAddress};
pub use document::{AssembledDocument, XmlElement};
pub use error::{Result, UnsupportedVersionError};
pub use field::{CanonicalField, FieldKind, FieldScope};
pub use layout::RecordLayout;
pub use parallel::{DEFAULT_PARALLEL_THRESHOLD, ordered_map};
pub use record::{RawRecord, RecordPosition};
pub use report::{AssemblyWarning, ValidationReport, Violation};
pub use version::SchemaVersion;
