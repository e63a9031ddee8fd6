//! Pipeline orchestration for pain.001 generation.
//!
//! One run takes a source and a schema revision through a fixed sequence
//! of stages:
//!
//! ```text
//! Configured → Loaded → Validated → Mapped → Assembled → Serialized → SchemaChecked → Done
//! ```
//!
//! Any stage may fail, and a failure ends the run. The outcome is a
//! [`RunReport`] that records the stage reached along with every field,
//! mapping or schema problem that was found. The output artifact is only
//! written once the document has passed schema validation.

pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stage;

// Error types
pub use error::{PipelineError, Result};

// Configuration
pub use cancel::CancellationToken;
pub use config::RunConfig;

// Execution
pub use pipeline::{Pipeline, run};
pub use report::{Failure, RunReport};
pub use stage::Stage;
