use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which source record an issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPosition {
    /// The record the batch header fields are read from.
    Header,
    /// Zero-based index into the transaction records.
    Transaction(usize),
}

impl fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordPosition::Header => f.write_str("header record"),
            RecordPosition::Transaction(index) => write!(f, "transaction {}", index + 1),
        }
    }
}

/// One source row: field names to values, exactly as read, in source order.
///
/// Lookups ignore ASCII case so `debtor_account_IBAN` and
/// `debtor_account_iban` name the same column. When a source repeats a
/// column name, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.push(name, value);
        }
        record
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = name.to_ascii_uppercase();
        let position = self.fields.len();
        self.index.entry(key).or_insert(position);
        self.fields.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(&name.to_ascii_uppercase())
            .map(|&position| self.fields[position].1.as_str())
    }

    /// Returns the value only when it is present and not blank.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
