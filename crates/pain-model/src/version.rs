//! Supported pain.001 schema revisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnsupportedVersionError;

/// A pain.001 revision. Exactly one governs a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// pain.001.001.03 (CustomerCreditTransferInitiationV03)
    #[serde(rename = "pain.001.001.03")]
    V03,
    /// pain.001.001.04 (CustomerCreditTransferInitiationV04)
    #[serde(rename = "pain.001.001.04")]
    V04,
    /// pain.001.001.09 (CustomerCreditTransferInitiationV09)
    #[serde(rename = "pain.001.001.09")]
    V09,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V03, SchemaVersion::V04, SchemaVersion::V09];

    /// Two-digit revision code, e.g. `"03"`.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaVersion::V03 => "03",
            SchemaVersion::V04 => "04",
            SchemaVersion::V09 => "09",
        }
    }

    /// Full message type identifier, e.g. `"pain.001.001.03"`.
    pub fn message_type(&self) -> &'static str {
        match self {
            SchemaVersion::V03 => "pain.001.001.03",
            SchemaVersion::V04 => "pain.001.001.04",
            SchemaVersion::V09 => "pain.001.001.09",
        }
    }

    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(SchemaVersion::message_type)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_type())
    }
}

impl FromStr for SchemaVersion {
    type Err = UnsupportedVersionError;

    /// Accepts the bare revision (`"03"`, `"3"`) or the message type
    /// (`"pain.001.001.03"`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let code = normalized
            .strip_prefix("pain.001.001.")
            .unwrap_or(normalized.as_str());
        match code {
            "03" | "3" => Ok(SchemaVersion::V03),
            "04" | "4" => Ok(SchemaVersion::V04),
            "09" | "9" => Ok(SchemaVersion::V09),
            _ => Err(UnsupportedVersionError {
                requested: s.to_string(),
                supported: Self::supported_list(),
            }),
        }
    }
}
