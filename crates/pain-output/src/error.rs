//! Error types for rendering and writing documents.

use std::path::PathBuf;

use thiserror::Error;

/// The document tree could not be serialized.
#[derive(Debug, Error)]
#[error("failed to render document: {source}")]
pub struct RenderError {
    #[from]
    pub source: std::io::Error,
}

/// The output artifact could not be persisted.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating or filling the temporary file next to the target failed.
    #[error("failed to write temporary file in {}: {source}", dir.display())]
    Temporary {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move output into place at {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Path the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            WriteError::CreateDir { path, .. } | WriteError::Persist { path, .. } => path,
            WriteError::Temporary { dir, .. } => dir,
        }
    }
}
