//! Document assembly.
//!
//! The assembler knows the envelope shape (`Document`, message element,
//! one batch element, one transaction element per payment) and nothing
//! about individual tags: every value is placed at the path its revision's
//! [`TagLayout`](pain_standards::TagLayout) gives. Rules are in schema
//! order, so elements come out in schema order without sorting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use pain_model::datetime::format_timestamp;
use pain_model::{
    AssembledDocument, AssemblyWarning, CanonicalField, CanonicalHeader, CanonicalTransaction,
    XmlElement,
};
use pain_standards::{LayoutRule, LayoutSection, ValueSource, VersionDescriptor};

/// Builds documents for one revision.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler<'a> {
    descriptor: &'a VersionDescriptor,
}

/// Values a layout rule can draw on while one section is emitted.
struct Values<'v> {
    header: &'v CanonicalHeader,
    transaction: Option<&'v CanonicalTransaction>,
    generated_at: &'v str,
    count: usize,
    control_sum: Decimal,
}

impl Values<'_> {
    fn resolve(&self, source: ValueSource) -> Option<String> {
        match source {
            ValueSource::TransactionCount => Some(self.count.to_string()),
            ValueSource::ControlSum => Some(self.control_sum.to_string()),
            ValueSource::Field(CanonicalField::CreationDateTime) => Some(
                self.header
                    .creation_date_time
                    .clone()
                    .unwrap_or_else(|| self.generated_at.to_string()),
            ),
            ValueSource::Field(field) => match self.transaction {
                Some(transaction) => transaction.value(field),
                None => self.header.value(field),
            },
        }
    }
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(descriptor: &'a VersionDescriptor) -> Self {
        Self { descriptor }
    }

    /// Assembles the document.
    ///
    /// `generated_at` is used for `CreDtTm` when the source gave no creation
    /// time; nothing here reads the clock.
    pub fn assemble(
        &self,
        header: &CanonicalHeader,
        transactions: &[CanonicalTransaction],
        generated_at: DateTime<Utc>,
    ) -> AssembledDocument {
        let descriptor = self.descriptor;
        let layout = &descriptor.layout;
        let count = transactions.len();
        let control_sum: Decimal = transactions.iter().map(|tx| tx.amount).sum();
        let generated_at = format_timestamp(generated_at);

        let mut values = Values {
            header,
            transaction: None,
            generated_at: &generated_at,
            count,
            control_sum,
        };

        let mut message = XmlElement::new(descriptor.message_element.as_str());
        apply_rules(&mut message, layout.section(LayoutSection::Group), &values);

        let mut batch = XmlElement::new(descriptor.batch_element.as_str());
        apply_rules(&mut batch, layout.section(LayoutSection::Batch), &values);

        for transaction in transactions {
            values.transaction = Some(transaction);
            let mut element = XmlElement::new(descriptor.transaction_element.as_str());
            apply_rules(
                &mut element,
                layout.section(LayoutSection::Transaction),
                &values,
            );
            batch.children.push(element);
        }
        message.children.push(batch);

        let mut root = XmlElement::new("Document");
        root.set_attribute("xmlns", descriptor.namespace.as_str());
        root.children.push(message);

        let warnings = aggregate_warnings(header, count, control_sum);
        for warning in &warnings {
            warn!(version = %descriptor.version, "{warning}");
        }
        debug!(
            version = %descriptor.version,
            transactions = count,
            control_sum = %control_sum,
            "Assembled document"
        );

        AssembledDocument {
            version: descriptor.version,
            root,
            transaction_count: count,
            control_sum,
            warnings,
        }
    }
}

/// Assembles a document with the layout of `descriptor`.
pub fn assemble(
    header: &CanonicalHeader,
    transactions: &[CanonicalTransaction],
    descriptor: &VersionDescriptor,
    generated_at: DateTime<Utc>,
) -> AssembledDocument {
    DocumentAssembler::new(descriptor).assemble(header, transactions, generated_at)
}

fn apply_rules<'r>(
    section: &mut XmlElement,
    rules: impl Iterator<Item = &'r LayoutRule>,
    values: &Values<'_>,
) {
    for rule in rules {
        // Absent optional values produce no element at all, so no empty
        // containers are left behind either.
        let Some(text) = values.resolve(rule.source) else {
            continue;
        };
        let mut leaf = XmlElement::with_text(leaf_name(rule), text);
        for attribute in &rule.attributes {
            if let Some(value) = values.resolve(attribute.source) {
                leaf.set_attribute(attribute.name.as_str(), value);
            }
        }
        let parent = container(section, &rule.path[..rule.path.len().saturating_sub(1)]);
        parent.children.push(leaf);
    }
}

fn leaf_name(rule: &LayoutRule) -> &str {
    rule.path.last().map_or("", String::as_str)
}

/// Walks `path` below `section`, reusing the last child when it has the
/// wanted name and appending a new one otherwise.
fn container<'e>(section: &'e mut XmlElement, path: &[String]) -> &'e mut XmlElement {
    let mut node = section;
    for segment in path {
        let reuse = node
            .children
            .last()
            .is_some_and(|last| last.name == *segment);
        if !reuse {
            node.children.push(XmlElement::new(segment.as_str()));
        }
        let last = node.children.len() - 1;
        node = &mut node.children[last];
    }
    node
}

fn aggregate_warnings(
    header: &CanonicalHeader,
    count: usize,
    control_sum: Decimal,
) -> Vec<AssemblyWarning> {
    let mut warnings = Vec::new();
    if let Some(declared) = header.declared_transaction_count
        && declared != count
    {
        warnings.push(AssemblyWarning::CountMismatch {
            declared,
            actual: count,
        });
    }
    if let Some(declared) = header.declared_control_sum
        && declared != control_sum
    {
        warnings.push(AssemblyWarning::ControlSumMismatch {
            declared,
            actual: control_sum,
        });
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_reuses_only_the_last_sibling() {
        let mut section = XmlElement::new("PmtInf");
        let path = |names: &[&str]| names.iter().map(|name| name.to_string()).collect::<Vec<_>>();

        container(&mut section, &path(&["Dbtr"]))
            .children
            .push(XmlElement::with_text("Nm", "Acme"));
        container(&mut section, &path(&["Dbtr", "PstlAdr"]))
            .children
            .push(XmlElement::with_text("Ctry", "DE"));
        section.children.push(XmlElement::with_text("ChrgBr", "SLEV"));
        container(&mut section, &path(&["Dbtr"]));

        let names: Vec<&str> = section.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Dbtr", "ChrgBr", "Dbtr"]);
        assert_eq!(section.text_at("Dbtr/PstlAdr/Ctry"), Some("DE"));
    }
}
