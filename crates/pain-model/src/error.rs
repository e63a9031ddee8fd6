use thiserror::Error;

/// A schema revision string that does not name a supported pain.001 revision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported schema version '{requested}' (supported: {supported})")]
pub struct UnsupportedVersionError {
    pub requested: String,
    pub supported: String,
}

pub type Result<T> = std::result::Result<T, UnsupportedVersionError>;
