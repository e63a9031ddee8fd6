//! Output artifact naming and persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use pain_model::SchemaVersion;

use crate::error::WriteError;

/// `<dir>/<source stem>.<message type>.xml`, so documents generated for
/// different revisions from one source never overwrite each other.
pub fn output_path(dir: &Path, source: &Path, version: SchemaVersion) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "payments".to_string());
    dir.join(format!("{stem}.{}.xml", version.message_type()))
}

/// Writes `bytes` to `target` atomically.
///
/// The content goes to a temporary file in the target's directory first and
/// is renamed into place once complete. On failure the temporary file is
/// removed and `target` is left as it was.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let temporary = |source| WriteError::Temporary {
        dir: dir.clone(),
        source,
    };
    let mut file = NamedTempFile::new_in(&dir).map_err(temporary)?;
    file.write_all(bytes).map_err(temporary)?;
    file.as_file().sync_all().map_err(temporary)?;

    file.persist(target).map_err(|e| WriteError::Persist {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    debug!(path = %target.display(), bytes = bytes.len(), "Wrote output artifact");
    Ok(())
}
