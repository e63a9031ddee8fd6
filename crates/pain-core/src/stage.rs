use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages, in the order a run passes through them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing has happened yet.
    #[default]
    Pending,
    /// Revision resolved and schema resource compiled.
    Configured,
    Loaded,
    Validated,
    Mapped,
    Assembled,
    Serialized,
    SchemaChecked,
    /// Artifact written.
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Configured => "configured",
            Stage::Loaded => "loaded",
            Stage::Validated => "validated",
            Stage::Mapped => "mapped",
            Stage::Assembled => "assembled",
            Stage::Serialized => "serialized",
            Stage::SchemaChecked => "schema_checked",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
