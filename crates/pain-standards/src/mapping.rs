//! Per-revision field mapping tables.
//!
//! Each table row names one canonical field, the raw column synonyms that
//! may supply it (highest priority first), an optional default, and
//! whether the field is mandatory for the revision. `max_length` and
//! `codes` carry the length limit and closed code list of the element the
//! field lands in. A default written as
//! `@field` takes the resolved value of another header field, which is how
//! a transaction inherits the batch currency.

use std::collections::BTreeSet;
use std::io::Cursor;

use serde::Deserialize;

use pain_model::{CanonicalField, FieldScope, RawRecord};

use crate::error::{Result, StandardsError};

/// Fallback used when no synonym supplies a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Literal(String),
    /// Value of a header field, resolved earlier.
    Field(CanonicalField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub synonyms: Vec<String>,
    pub default: Option<DefaultValue>,
    pub required: bool,
    /// Longest value, in characters, the target element accepts.
    pub max_length: Option<usize>,
    /// Closed code list; empty when any code of the field's kind is valid.
    pub codes: Vec<String>,
}

impl FieldRule {
    /// First synonym with a non-blank value in `record`, as
    /// `(column, value)`.
    pub fn lookup<'r>(&self, record: &'r RawRecord) -> Option<(&str, &'r str)> {
        self.synonyms.iter().find_map(|synonym| {
            record
                .non_blank(synonym)
                .map(|value| (synonym.as_str(), value))
        })
    }
}

/// Immutable mapping table for one revision.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    rules: Vec<FieldRule>,
}

#[derive(Debug, Deserialize)]
struct MappingCsvRow {
    field: String,
    synonyms: String,
    default: String,
    required: bool,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    codes: String,
}

impl MappingTable {
    pub fn from_rules(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Parses a table from CSV text; `file` names the table in errors.
    pub fn from_csv(content: &str, file: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(content.as_bytes()));

        let mut seen = BTreeSet::new();
        let mut rules = Vec::new();
        for result in reader.deserialize::<MappingCsvRow>() {
            let row = result.map_err(|e| StandardsError::CsvParse {
                file: file.to_string(),
                message: e.to_string(),
            })?;

            let field: CanonicalField =
                row.field.parse().map_err(|_| StandardsError::InvalidValue {
                    field: "field",
                    value: row.field.clone(),
                    file: file.to_string(),
                })?;
            if !seen.insert(field) {
                return Err(StandardsError::DuplicateField {
                    field: field.to_string(),
                    file: file.to_string(),
                });
            }

            let default = parse_default(&row.default, file)?;
            let codes = split_list(&row.codes);
            if let Some(DefaultValue::Literal(literal)) = &default
                && !codes.is_empty()
                && !codes.contains(literal)
            {
                return Err(StandardsError::InvalidValue {
                    field: "default",
                    value: literal.clone(),
                    file: file.to_string(),
                });
            }

            rules.push(FieldRule {
                field,
                synonyms: split_list(&row.synonyms),
                default,
                required: row.required,
                max_length: row.max_length,
                codes,
            });
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field: CanonicalField) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    /// Rules for one scope, in table order.
    pub fn scoped(&self, scope: FieldScope) -> impl Iterator<Item = &FieldRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.field.scope() == scope)
    }

    pub fn is_required(&self, field: CanonicalField) -> bool {
        self.rule(field).is_some_and(|rule| rule.required)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_default(value: &str, file: &str) -> Result<Option<DefaultValue>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let Some(reference) = value.strip_prefix('@') else {
        return Ok(Some(DefaultValue::Literal(value.to_string())));
    };
    let field = reference
        .parse::<CanonicalField>()
        .ok()
        .filter(|field| field.scope() == FieldScope::Header)
        .ok_or_else(|| StandardsError::InvalidValue {
            field: "default",
            value: value.to_string(),
            file: file.to_string(),
        })?;
    Ok(Some(DefaultValue::Field(field)))
}
