use serde::{Deserialize, Serialize};
use std::fmt;

/// How the loaded records divide into the batch header and transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// The first record carries the header fields only; every later record
    /// is one transaction.
    #[default]
    HeaderRow,
    /// Every record is a transaction. Header fields are read from the first.
    Inline,
}

impl RecordLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordLayout::HeaderRow => "header_row",
            RecordLayout::Inline => "inline",
        }
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
