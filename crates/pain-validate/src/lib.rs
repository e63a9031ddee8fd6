//! Validation for the pain.001 pipeline.
//!
//! Two independent checks live here:
//!
//! - [`RecordValidator`] runs before anything is mapped. It checks that every
//!   mandatory field of the active revision is present and that dates,
//!   amounts, identifiers and codes are syntactically valid. It reports every
//!   problem in the source at once.
//! - [`CompiledSchema`] checks a serialized document against a schema
//!   definition. It covers element order and cardinality, required
//!   attributes and restriction facets. Every violation is reported with its
//!   element path.
//!
//! The schema engine understands the subset of XML Schema that the pain.001
//! definitions use. Anything outside it is rejected when the schema is
//! compiled, so an unsupported definition can never pass a document by
//! accident.

pub mod error;
pub mod record;
pub mod schema;
pub mod xml;

// Error types
pub use error::{
    EmptySourceError, FieldValidationError, RecordCheckError, SchemaResourceError,
    ValidationFailure,
};

// Record checks
pub use record::{FieldError, FieldIssue, RecordBatch, RecordValidator};

// Schema checks
pub use schema::{CompiledSchema, SchemaResource, validate};
