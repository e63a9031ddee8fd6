//! Document output for pain.001.
//!
//! - [`assemble`] builds the document tree from canonical records, with
//!   `NbOfTxs` and `CtrlSum` recomputed from the transactions
//! - [`TemplateRenderer`] turns a tree into document bytes; [`XmlTreeRenderer`]
//!   is the provided implementation
//! - [`write_atomic`] persists the bytes without ever leaving a partial file
//!   at the target path

pub mod assemble;
pub mod error;
pub mod render;
pub mod writer;

// Error types
pub use error::{RenderError, WriteError};

// Assembly
pub use assemble::{DocumentAssembler, assemble};

// Rendering
pub use render::{TemplateRenderer, XmlTreeRenderer};

// Artifacts
pub use writer::{output_path, write_atomic};
