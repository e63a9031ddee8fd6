//! Schema validation of serialized documents.
//!
//! A [`SchemaResource`] holds definition text, either embedded with the
//! standards data or read from a user-supplied file. Compiling it yields a
//! [`CompiledSchema`] that can check any number of documents.

mod check;
mod compile;
mod facets;
mod model;

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use pain_model::ValidationReport;
use pain_standards::VersionDescriptor;

use crate::error::SchemaResourceError;
use crate::xml;

pub use model::XSD_NAMESPACE;

use model::{ElementDecl, TypeDef, TypeId};

/// Schema definition text and where it came from.
#[derive(Debug, Clone)]
pub struct SchemaResource {
    origin: String,
    text: Cow<'static, str>,
}

impl SchemaResource {
    /// The definition shipped with the standards data for a revision.
    pub fn embedded(descriptor: &VersionDescriptor) -> Self {
        Self {
            origin: descriptor.schema_name(),
            text: Cow::Borrowed(descriptor.schema),
        }
    }

    /// Reads a definition file.
    pub fn from_path(path: &Path) -> Result<Self, SchemaResourceError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            SchemaResourceError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self {
            origin: path.display().to_string(),
            text: Cow::Owned(text),
        })
    }

    pub fn from_text(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: Cow::Owned(text.into()),
        }
    }

    /// File name or path used in messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn compile(&self) -> Result<CompiledSchema, SchemaResourceError> {
        let schema = compile::compile(&self.origin, &self.text)?;
        debug!(
            origin = %self.origin,
            types = schema.types.len(),
            roots = schema.roots.len(),
            "Compiled schema"
        );
        Ok(schema)
    }
}

/// A schema ready to check documents.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) origin: String,
    pub(crate) target_namespace: Option<String>,
    /// Local elements must be in the target namespace.
    pub(crate) qualified_elements: bool,
    pub(crate) roots: Vec<ElementDecl>,
    pub(crate) types: Vec<TypeDef>,
}

impl CompiledSchema {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Names of the elements a document may start with.
    pub fn document_elements(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(|decl| decl.name.as_str())
    }

    /// Checks a serialized document. See [`validate`].
    pub fn validate(&self, serialized: &[u8]) -> ValidationReport {
        validate(serialized, self)
    }

    pub(crate) fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0]
    }
}

/// Checks `serialized` against `schema` and reports every violation.
///
/// A document that is not UTF-8 or not well-formed yields a single
/// violation located at `/`.
pub fn validate(serialized: &[u8], schema: &CompiledSchema) -> ValidationReport {
    let report = match std::str::from_utf8(serialized) {
        Err(e) => single_violation(format!("document is not valid UTF-8: {e}")),
        Ok(text) => match xml::parse(text) {
            Err(e) => single_violation(format!("document is not well-formed: {e}")),
            Ok(root) => check::check_document(schema, &root),
        },
    };
    debug!(
        schema = %schema.origin,
        violations = report.len(),
        "Schema check finished"
    );
    report
}

fn single_violation(message: String) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.push("/", message);
    report
}
