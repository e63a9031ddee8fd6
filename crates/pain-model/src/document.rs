//! In-memory XML document tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::report::AssemblyWarning;
use crate::version::SchemaVersion;

/// An element with attributes, optional text content, and ordered children.
///
/// Mixed content is not modelled; pain.001 has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows a `/`-separated path of child names, taking the first match
    /// at each step.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut XmlElement> {
        let mut node = self;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            node = node.children.iter_mut().find(|child| child.name == segment)?;
        }
        Some(node)
    }

    /// Text of the element at `path`, if any.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(|node| node.text.as_deref())
    }
}

/// The assembled document plus the aggregates it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub version: SchemaVersion,
    pub root: XmlElement,
    pub transaction_count: usize,
    pub control_sum: Decimal,
    pub warnings: Vec<AssemblyWarning>,
}
