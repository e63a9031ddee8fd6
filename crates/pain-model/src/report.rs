use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single schema violation with the element path it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub location: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Outcome of validating a document against a schema resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn push(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            location: location.into(),
            message: message.into(),
        });
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Non-fatal discrepancy between what the source declared and what was
/// assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyWarning {
    CountMismatch { declared: usize, actual: usize },
    ControlSumMismatch { declared: Decimal, actual: Decimal },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::CountMismatch { declared, actual } => write!(
                f,
                "declared transaction count {declared} differs from assembled count {actual}"
            ),
            AssemblyWarning::ControlSumMismatch { declared, actual } => write!(
                f,
                "declared control sum {declared} differs from assembled sum {actual}"
            ),
        }
    }
}
