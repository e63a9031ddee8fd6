//! Schema definition compiler.
//!
//! Walks a parsed `xs:schema` document and builds the type arena. Every
//! named type is compiled, used or not, so an unsupported construct is
//! reported when the schema is loaded rather than when a document happens
//! to reach it.

use std::collections::HashMap;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::SchemaResourceError;
use crate::xml::{self, Node};

use super::CompiledSchema;
use super::model::{
    AttributeDecl, Builtin, ComplexType, Compositor, Content, ElementDecl, Facets, Group,
    NamespaceConstraint, Occurs, Particle, PatternGroup, ProcessContents, SimpleType, TypeDef,
    TypeId, Wildcard, XSD_NAMESPACE,
};

type Result<T> = std::result::Result<T, SchemaResourceError>;

pub(crate) fn compile(origin: &str, text: &str) -> Result<CompiledSchema> {
    let document = xml::parse(text).map_err(|e| SchemaResourceError::Malformed {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    if document.name != "schema" || document.namespace.as_deref() != Some(XSD_NAMESPACE) {
        return Err(SchemaResourceError::Malformed {
            origin: origin.to_string(),
            message: format!("root element <{}> is not xs:schema", document.name),
        });
    }

    let mut compiler = Compiler::new(origin, &document)?;
    let roots = compiler.compile_all()?;
    let types = compiler.finish()?;

    Ok(CompiledSchema {
        origin: origin.to_string(),
        target_namespace: document.attribute("targetNamespace").map(str::to_string),
        qualified_elements: document.attribute("elementFormDefault") == Some("qualified"),
        roots,
        types,
    })
}

struct Compiler<'x> {
    origin: &'x str,
    target_namespace: Option<&'x str>,
    /// Prefix bindings declared on `xs:schema`.
    namespaces: HashMap<Option<&'x str>, &'x str>,
    named_types: Vec<(&'x str, &'x Node)>,
    global_elements: Vec<(&'x str, &'x Node)>,
    /// `None` while a type is being compiled.
    types: Vec<Option<TypeDef>>,
    resolved: HashMap<&'x str, TypeId>,
    builtins: HashMap<Builtin, TypeId>,
}

impl<'x> Compiler<'x> {
    fn new(origin: &'x str, schema: &'x Node) -> Result<Self> {
        let mut compiler = Self {
            origin,
            target_namespace: schema.attribute("targetNamespace"),
            namespaces: schema.declarations().collect(),
            named_types: Vec::new(),
            global_elements: Vec::new(),
            types: Vec::new(),
            resolved: HashMap::new(),
            builtins: HashMap::new(),
        };

        for child in compiler.schema_children(schema)? {
            match child.name.as_str() {
                "element" => {
                    let name = compiler.required_attribute(child, "name")?;
                    compiler.global_elements.push((name, child));
                }
                "complexType" | "simpleType" => {
                    let name = compiler.required_attribute(child, "name")?;
                    if compiler.named_types.iter().any(|(seen, _)| *seen == name) {
                        return Err(compiler.malformed(format!("type '{name}' is defined twice")));
                    }
                    compiler.named_types.push((name, child));
                }
                other => return Err(compiler.unsupported(format!("xs:{other}"))),
            }
        }
        if compiler.global_elements.is_empty() {
            return Err(compiler.malformed("schema declares no global element".to_string()));
        }
        Ok(compiler)
    }

    /// Compiles every named type and returns the global element
    /// declarations.
    fn compile_all(&mut self) -> Result<Vec<ElementDecl>> {
        let names: Vec<&'x str> = self.named_types.iter().map(|(name, _)| *name).collect();
        for name in names {
            self.named_type(name)?;
        }

        let globals = self.global_elements.clone();
        globals
            .into_iter()
            .map(|(name, node)| {
                Ok(ElementDecl {
                    name: name.to_string(),
                    type_id: self.element_type(node)?,
                    occurs: Occurs::ONCE,
                })
            })
            .collect()
    }

    fn finish(self) -> Result<Vec<TypeDef>> {
        let origin = self.origin;
        self.types
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SchemaResourceError::Malformed {
                origin: origin.to_string(),
                message: "type definition left incomplete".to_string(),
            })
    }

    // === Type references ===

    fn resolve_type(&mut self, qname: &'x str) -> Result<TypeId> {
        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, qname),
        };
        let namespace = self.namespaces.get(&prefix).copied();

        if namespace == Some(XSD_NAMESPACE) {
            let builtin = Builtin::from_local_name(local)
                .ok_or_else(|| self.unsupported(format!("built-in type xs:{local}")))?;
            return Ok(self.builtin_type(builtin));
        }
        if namespace.filter(|ns| !ns.is_empty()) == self.target_namespace {
            return self.named_type(local);
        }
        Err(self.unresolved(qname))
    }

    fn named_type(&mut self, name: &'x str) -> Result<TypeId> {
        if let Some(id) = self.resolved.get(name) {
            return Ok(*id);
        }
        let node = self
            .named_types
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, node)| *node)
            .ok_or_else(|| self.unresolved(name))?;

        let id = self.reserve();
        self.resolved.insert(name, id);
        let definition = match node.name.as_str() {
            "complexType" => TypeDef::Complex(self.complex_type(node)?),
            _ => TypeDef::Simple(self.simple_type(node)?),
        };
        self.types[id.0] = Some(definition);
        Ok(id)
    }

    fn builtin_type(&mut self, builtin: Builtin) -> TypeId {
        if let Some(id) = self.builtins.get(&builtin) {
            return *id;
        }
        let id = self.push(TypeDef::Simple(SimpleType {
            builtin,
            facets: Facets::default(),
        }));
        self.builtins.insert(builtin, id);
        id
    }

    fn reserve(&mut self) -> TypeId {
        self.types.push(None);
        TypeId(self.types.len() - 1)
    }

    fn push(&mut self, definition: TypeDef) -> TypeId {
        self.types.push(Some(definition));
        TypeId(self.types.len() - 1)
    }

    /// The compiled simple type behind `id`.
    fn simple_at(&self, id: TypeId, context: &str) -> Result<SimpleType> {
        match self.types.get(id.0) {
            Some(Some(TypeDef::Simple(simple))) => Ok(simple.clone()),
            Some(Some(TypeDef::Complex(_))) => {
                Err(self.unsupported(format!("{context} based on a complex type")))
            }
            _ => Err(self.unsupported(format!("circular derivation in {context}"))),
        }
    }

    // === Elements and content models ===

    fn element(&mut self, node: &'x Node) -> Result<ElementDecl> {
        let occurs = self.occurs(node)?;
        if let Some(reference) = node.attribute("ref") {
            let local = reference.rsplit(':').next().unwrap_or(reference);
            let target = self
                .global_elements
                .iter()
                .find(|(name, _)| *name == local)
                .map(|(_, node)| *node)
                .ok_or_else(|| self.malformed(format!("undefined element reference '{reference}'")))?;
            return Ok(ElementDecl {
                name: local.to_string(),
                type_id: self.element_type(target)?,
                occurs,
            });
        }

        let name = self.required_attribute(node, "name")?;
        Ok(ElementDecl {
            name: name.to_string(),
            type_id: self.element_type(node)?,
            occurs,
        })
    }

    fn element_type(&mut self, node: &'x Node) -> Result<TypeId> {
        if let Some(type_name) = node.attribute("type") {
            return self.resolve_type(type_name);
        }
        for child in self.schema_children(node)? {
            match child.name.as_str() {
                "complexType" => {
                    let id = self.reserve();
                    let complex = self.complex_type(child)?;
                    self.types[id.0] = Some(TypeDef::Complex(complex));
                    return Ok(id);
                }
                "simpleType" => {
                    let simple = self.simple_type(child)?;
                    return Ok(self.push(TypeDef::Simple(simple)));
                }
                _ => {}
            }
        }
        let name = node.attribute("name").unwrap_or("?");
        Err(self.unsupported(format!("element '{name}' without a type")))
    }

    fn complex_type(&mut self, node: &'x Node) -> Result<ComplexType> {
        if matches!(node.attribute("mixed"), Some("true" | "1")) {
            return Err(self.unsupported("mixed content".to_string()));
        }
        let mut content = Content::Empty;
        let mut attributes = Vec::new();
        for child in self.schema_children(node)? {
            match child.name.as_str() {
                "sequence" | "choice" => {
                    if !matches!(content, Content::Empty) {
                        return Err(self.malformed("complex type has two content models".to_string()));
                    }
                    content = Content::Elements(self.group(child)?);
                }
                "simpleContent" => {
                    content = Content::Simple(self.simple_content(child, &mut attributes)?);
                }
                "attribute" => attributes.extend(self.attribute(child)?),
                other => return Err(self.unsupported(format!("xs:{other}"))),
            }
        }
        Ok(ComplexType {
            content,
            attributes,
        })
    }

    fn group(&mut self, node: &'x Node) -> Result<Group> {
        let compositor = match node.name.as_str() {
            "sequence" => Compositor::Sequence,
            _ => Compositor::Choice,
        };
        let occurs = self.occurs(node)?;
        let mut particles = Vec::new();
        for child in self.schema_children(node)? {
            let particle = match child.name.as_str() {
                "element" => Particle::Element(self.element(child)?),
                "sequence" | "choice" => Particle::Group(self.group(child)?),
                "any" => Particle::Wildcard(self.wildcard(child)?),
                other => return Err(self.unsupported(format!("xs:{other}"))),
            };
            particles.push(particle);
        }
        Ok(Group {
            compositor,
            occurs,
            particles,
        })
    }

    fn wildcard(&self, node: &Node) -> Result<Wildcard> {
        let process = match node.attribute("processContents").map(str::trim) {
            None | Some("strict") => ProcessContents::Strict,
            Some("lax") => ProcessContents::Lax,
            Some("skip") => ProcessContents::Skip,
            Some(other) => {
                return Err(self.malformed(format!("invalid processContents '{other}'")));
            }
        };
        let target = self.target_namespace.map(str::to_string);
        let namespaces = match node.attribute("namespace").map(str::trim) {
            None | Some("##any") => NamespaceConstraint::Any,
            Some("##other") => NamespaceConstraint::Other(target),
            Some(list) => NamespaceConstraint::List(
                list.split_whitespace()
                    .map(|uri| match uri {
                        "##local" => None,
                        "##targetNamespace" => target.clone(),
                        uri => Some(uri.to_string()),
                    })
                    .collect(),
            ),
        };
        Ok(Wildcard {
            namespaces,
            process,
            occurs: self.occurs(node)?,
        })
    }

    fn simple_content(
        &mut self,
        node: &'x Node,
        attributes: &mut Vec<AttributeDecl>,
    ) -> Result<TypeId> {
        let children = self.schema_children(node)?;
        let Some(&extension) = children.first() else {
            return Err(self.malformed("empty xs:simpleContent".to_string()));
        };
        if extension.name != "extension" {
            return Err(self.unsupported(format!("xs:simpleContent/xs:{}", extension.name)));
        }

        let base = self.required_attribute(extension, "base")?;
        let base_id = self.resolve_type(base)?;
        self.simple_at(base_id, "xs:simpleContent extension")?;

        for child in self.schema_children(extension)? {
            match child.name.as_str() {
                "attribute" => attributes.extend(self.attribute(child)?),
                other => return Err(self.unsupported(format!("xs:extension/xs:{other}"))),
            }
        }
        Ok(base_id)
    }

    /// `None` for a prohibited attribute.
    fn attribute(&mut self, node: &'x Node) -> Result<Option<AttributeDecl>> {
        if node.attribute("ref").is_some() {
            return Err(self.unsupported("attribute reference".to_string()));
        }
        let name = self.required_attribute(node, "name")?;
        let required = match node.attribute("use") {
            Some("required") => true,
            Some("prohibited") => return Ok(None),
            _ => false,
        };

        let type_id = match node.attribute("type") {
            Some(type_name) => self.resolve_type(type_name)?,
            None => match self.schema_children(node)?.first() {
                Some(&child) if child.name == "simpleType" => {
                    let simple = self.simple_type(child)?;
                    self.push(TypeDef::Simple(simple))
                }
                _ => self.builtin_type(Builtin::String),
            },
        };
        self.simple_at(type_id, "attribute")?;

        Ok(Some(AttributeDecl {
            name: name.to_string(),
            type_id,
            required,
        }))
    }

    // === Simple types ===

    fn simple_type(&mut self, node: &'x Node) -> Result<SimpleType> {
        let children = self.schema_children(node)?;
        let Some(&derivation) = children.first() else {
            return Err(self.malformed("empty xs:simpleType".to_string()));
        };
        if derivation.name != "restriction" {
            return Err(self.unsupported(format!("xs:{}", derivation.name)));
        }

        let facet_nodes = self.schema_children(derivation)?;
        let mut facet_nodes = facet_nodes.as_slice();
        let mut simple = match derivation.attribute("base") {
            Some(base) => {
                let id = self.resolve_type(base)?;
                self.simple_at(id, "xs:restriction")?
            }
            None => match facet_nodes.split_first() {
                Some((&inline, rest)) if inline.name == "simpleType" => {
                    facet_nodes = rest;
                    self.simple_type(inline)?
                }
                _ => return Err(self.malformed("xs:restriction without a base".to_string())),
            },
        };

        self.apply_facets(&mut simple, facet_nodes)?;
        Ok(simple)
    }

    fn apply_facets(&self, simple: &mut SimpleType, nodes: &[&'x Node]) -> Result<()> {
        let facets = &mut simple.facets;
        let mut patterns = Vec::new();
        let mut enumeration = Vec::new();

        for &node in nodes {
            let facet = node.name.as_str();
            let value = self.required_attribute(node, "value")?;
            match facet {
                "pattern" => patterns.push(value.to_string()),
                "enumeration" => enumeration.push(value.to_string()),
                "length" => facets.length = Some(self.facet_number(facet, value)?),
                "minLength" => facets.min_length = Some(self.facet_number(facet, value)?),
                "maxLength" => facets.max_length = Some(self.facet_number(facet, value)?),
                "totalDigits" => facets.total_digits = Some(self.facet_number(facet, value)?),
                "fractionDigits" => facets.fraction_digits = Some(self.facet_number(facet, value)?),
                "minInclusive" | "maxInclusive" => {
                    if simple.builtin != Builtin::Decimal {
                        return Err(self.unsupported(format!(
                            "xs:{facet} on xs:{}",
                            simple.builtin.name()
                        )));
                    }
                    let bound = Decimal::from_str(value)
                        .map_err(|e| self.invalid_facet(facet, value, e.to_string()))?;
                    if facet == "minInclusive" {
                        facets.min_inclusive = Some(bound);
                    } else {
                        facets.max_inclusive = Some(bound);
                    }
                }
                other => return Err(self.unsupported(format!("xs:{other} facet"))),
            }
        }

        if !patterns.is_empty() {
            let alternatives: Vec<String> =
                patterns.iter().map(|pattern| format!("(?:{pattern})")).collect();
            let regex = Regex::new(&format!("^(?:{})$", alternatives.join("|")))
                .map_err(|e| self.invalid_facet("pattern", &patterns.join(" | "), e.to_string()))?;
            facets.patterns.push(PatternGroup {
                sources: patterns,
                regex,
            });
        }
        // A derived enumeration narrows the inherited one.
        if !enumeration.is_empty() {
            facets.enumeration = enumeration;
        }
        Ok(())
    }

    fn facet_number<N: FromStr>(&self, facet: &str, value: &str) -> Result<N> {
        value
            .trim()
            .parse()
            .map_err(|_| self.invalid_facet(facet, value, "expected a non-negative integer".to_string()))
    }

    // === Helpers ===

    fn occurs(&self, node: &Node) -> Result<Occurs> {
        let min = match node.attribute("minOccurs") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| self.malformed(format!("invalid minOccurs '{value}'")))?,
            None => 1,
        };
        let max = match node.attribute("maxOccurs").map(str::trim) {
            Some("unbounded") => None,
            Some(value) => Some(
                value
                    .parse()
                    .map_err(|_| self.malformed(format!("invalid maxOccurs '{value}'")))?,
            ),
            None => Some(1),
        };
        if max.is_some_and(|max| max < min) {
            return Err(self.malformed(format!("maxOccurs is below minOccurs {min}")));
        }
        Ok(Occurs { min, max })
    }

    /// Schema children of `node`, annotations skipped.
    fn schema_children(&self, node: &'x Node) -> Result<Vec<&'x Node>> {
        let mut children = Vec::new();
        for child in &node.children {
            if child.namespace.as_deref() != Some(XSD_NAMESPACE) {
                return Err(self.malformed(format!("foreign element <{}> in schema", child.name)));
            }
            if child.name != "annotation" {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn required_attribute(&self, node: &'x Node, name: &str) -> Result<&'x str> {
        node.attribute(name).ok_or_else(|| {
            self.malformed(format!("xs:{} is missing its '{name}' attribute", node.name))
        })
    }

    fn malformed(&self, message: String) -> SchemaResourceError {
        SchemaResourceError::Malformed {
            origin: self.origin.to_string(),
            message,
        }
    }

    fn unsupported(&self, construct: String) -> SchemaResourceError {
        SchemaResourceError::Unsupported {
            origin: self.origin.to_string(),
            construct,
        }
    }

    fn unresolved(&self, name: &str) -> SchemaResourceError {
        SchemaResourceError::UnresolvedType {
            origin: self.origin.to_string(),
            name: name.to_string(),
        }
    }

    fn invalid_facet(&self, facet: &str, value: &str, message: String) -> SchemaResourceError {
        SchemaResourceError::InvalidFacet {
            origin: self.origin.to_string(),
            facet: facet.to_string(),
            value: value.to_string(),
            message,
        }
    }
}
