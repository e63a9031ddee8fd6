//! Per-revision tag layouts.
//!
//! A layout lists, in schema order, the element path each value is emitted
//! at. Paths are relative to the section root: the message element for
//! `group`, the batch element for `batch`, and one transaction element for
//! `transaction`.

use std::fmt;
use std::io::Cursor;

use serde::Deserialize;

use pain_model::{CanonicalField, FieldScope};

use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutSection {
    Group,
    Batch,
    Transaction,
}

impl LayoutSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutSection::Group => "group",
            LayoutSection::Batch => "batch",
            LayoutSection::Transaction => "transaction",
        }
    }

    fn scope(&self) -> FieldScope {
        match self {
            LayoutSection::Group | LayoutSection::Batch => FieldScope::Header,
            LayoutSection::Transaction => FieldScope::Transaction,
        }
    }
}

impl fmt::Display for LayoutSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an emitted value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Field(CanonicalField),
    /// Number of assembled transactions.
    TransactionCount,
    /// Sum of assembled transaction amounts.
    ControlSum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRule {
    pub name: String,
    pub source: ValueSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRule {
    pub section: LayoutSection,
    pub path: Vec<String>,
    pub source: ValueSource,
    pub attributes: Vec<AttributeRule>,
}

/// Ordered emission rules for one revision.
#[derive(Debug, Clone, Default)]
pub struct TagLayout {
    rules: Vec<LayoutRule>,
}

#[derive(Debug, Deserialize)]
struct LayoutCsvRow {
    section: String,
    path: String,
    source: String,
    #[serde(default)]
    attributes: String,
}

impl TagLayout {
    pub fn from_csv(content: &str, file: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(content.as_bytes()));

        let mut rules = Vec::new();
        for result in reader.deserialize::<LayoutCsvRow>() {
            let row = result.map_err(|e| StandardsError::CsvParse {
                file: file.to_string(),
                message: e.to_string(),
            })?;

            let section = parse_section(&row.section, file)?;
            let path: Vec<String> = row
                .path
                .split('/')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect();
            if path.is_empty() {
                return Err(StandardsError::InvalidValue {
                    field: "path",
                    value: row.path.clone(),
                    file: file.to_string(),
                });
            }

            let source = parse_source(&row.source, section, file)?;
            let attributes = row
                .attributes
                .split('|')
                .map(str::trim)
                .filter(|binding| !binding.is_empty())
                .map(|binding| parse_attribute(binding, section, file))
                .collect::<Result<Vec<_>>>()?;

            rules.push(LayoutRule {
                section,
                path,
                source,
                attributes,
            });
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[LayoutRule] {
        &self.rules
    }

    pub fn section(&self, section: LayoutSection) -> impl Iterator<Item = &LayoutRule> {
        self.rules.iter().filter(move |rule| rule.section == section)
    }

    /// Canonical fields this layout emits, as element text or attribute.
    pub fn fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.rules.iter().flat_map(|rule| {
            std::iter::once(rule.source)
                .chain(rule.attributes.iter().map(|attribute| attribute.source))
                .filter_map(|source| match source {
                    ValueSource::Field(field) => Some(field),
                    _ => None,
                })
        })
    }
}

fn parse_section(value: &str, file: &str) -> Result<LayoutSection> {
    match value.to_ascii_lowercase().as_str() {
        "group" => Ok(LayoutSection::Group),
        "batch" => Ok(LayoutSection::Batch),
        "transaction" => Ok(LayoutSection::Transaction),
        _ => Err(StandardsError::InvalidValue {
            field: "section",
            value: value.to_string(),
            file: file.to_string(),
        }),
    }
}

fn parse_source(value: &str, section: LayoutSection, file: &str) -> Result<ValueSource> {
    let source = match value {
        "#transaction_count" => ValueSource::TransactionCount,
        "#control_sum" => ValueSource::ControlSum,
        name => ValueSource::Field(name.parse().map_err(|_| StandardsError::InvalidValue {
            field: "source",
            value: value.to_string(),
            file: file.to_string(),
        })?),
    };

    let fits = match source {
        ValueSource::Field(field) => field.scope() == section.scope(),
        ValueSource::TransactionCount | ValueSource::ControlSum => {
            section != LayoutSection::Transaction
        }
    };
    if !fits {
        return Err(StandardsError::ScopeMismatch {
            field: value.to_string(),
            section: section.to_string(),
            file: file.to_string(),
        });
    }
    Ok(source)
}

fn parse_attribute(binding: &str, section: LayoutSection, file: &str) -> Result<AttributeRule> {
    let Some((name, source)) = binding.split_once('=') else {
        return Err(StandardsError::InvalidValue {
            field: "attributes",
            value: binding.to_string(),
            file: file.to_string(),
        });
    };
    Ok(AttributeRule {
        name: name.trim().to_string(),
        source: parse_source(source.trim(), section, file)?,
    })
}
