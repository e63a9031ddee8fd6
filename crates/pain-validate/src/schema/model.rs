//! Compiled form of a schema definition.
//!
//! Named and anonymous types live in one arena indexed by [`TypeId`], so
//! element declarations can refer to a type before it is fully compiled
//! and recursive content models need no special casing.

use regex::Regex;
use rust_decimal::Decimal;

use crate::xml::Node;

/// Namespace of the schema definition language itself.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TypeId(pub(crate) usize);

/// `minOccurs`/`maxOccurs`; `max` is `None` for `unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occurs {
    pub min: usize,
    pub max: Option<usize>,
}

impl Occurs {
    pub const ONCE: Occurs = Occurs {
        min: 1,
        max: Some(1),
    };

    /// True if another occurrence after `count` is allowed.
    pub fn allows_more(&self, count: usize) -> bool {
        self.max.is_none_or(|max| count < max)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElementDecl {
    pub name: String,
    pub type_id: TypeId,
    pub occurs: Occurs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Compositor {
    Sequence,
    Choice,
}

#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub compositor: Compositor,
    pub occurs: Occurs,
    pub particles: Vec<Particle>,
}

/// `processContents` of an `xs:any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessContents {
    /// The element must have a global declaration and is checked against it.
    Strict,
    /// Checked against a global declaration when there is one.
    Lax,
    /// Only well-formedness is required.
    Skip,
}

/// Namespaces an `xs:any` admits. `None` entries stand for no namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NamespaceConstraint {
    Any,
    /// `##other`: namespace-qualified and not the given target namespace.
    Other(Option<String>),
    List(Vec<Option<String>>),
}

impl NamespaceConstraint {
    pub fn admits(&self, namespace: Option<&str>) -> bool {
        match self {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Other(target) => {
                namespace.is_some() && namespace != target.as_deref()
            }
            NamespaceConstraint::List(allowed) => {
                allowed.iter().any(|uri| uri.as_deref() == namespace)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Wildcard {
    pub namespaces: NamespaceConstraint,
    pub process: ProcessContents,
    pub occurs: Occurs,
}

#[derive(Debug, Clone)]
pub(crate) enum Particle {
    Element(ElementDecl),
    Group(Group),
    Wildcard(Wildcard),
}

impl Particle {
    pub fn occurs(&self) -> Occurs {
        match self {
            Particle::Element(decl) => decl.occurs,
            Particle::Group(group) => group.occurs,
            Particle::Wildcard(wildcard) => wildcard.occurs,
        }
    }

    /// True if the particle can match no elements at all.
    pub fn is_emptiable(&self) -> bool {
        if self.occurs().min == 0 {
            return true;
        }
        match self {
            Particle::Element(_) | Particle::Wildcard(_) => false,
            Particle::Group(group) => group.content_is_emptiable(),
        }
    }

    /// True if `node` can be the first element this particle matches.
    pub fn can_start_with(&self, node: &Node) -> bool {
        match self {
            Particle::Element(decl) => decl.name == node.name,
            Particle::Group(group) => group.can_start_with(node),
            Particle::Wildcard(wildcard) => wildcard.namespaces.admits(node.namespace.as_deref()),
        }
    }
}

impl Group {
    /// Emptiability of one repetition, ignoring the group's own bounds.
    pub fn content_is_emptiable(&self) -> bool {
        match self.compositor {
            Compositor::Sequence => self.particles.iter().all(Particle::is_emptiable),
            Compositor::Choice => self.particles.iter().any(Particle::is_emptiable),
        }
    }

    pub fn can_start_with(&self, node: &Node) -> bool {
        match self.compositor {
            Compositor::Choice => self.particles.iter().any(|p| p.can_start_with(node)),
            Compositor::Sequence => {
                for particle in &self.particles {
                    if particle.can_start_with(node) {
                        return true;
                    }
                    if !particle.is_emptiable() {
                        return false;
                    }
                }
                false
            }
        }
    }

    /// Element names this group can start with, for messages.
    pub fn first_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for particle in &self.particles {
            match particle {
                Particle::Element(decl) => names.push(decl.name.as_str()),
                Particle::Group(group) => names.extend(group.first_names()),
                Particle::Wildcard(_) => names.push("*"),
            }
            if self.compositor == Compositor::Sequence && !particle.is_emptiable() {
                break;
            }
        }
        names
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AttributeDecl {
    pub name: String,
    pub type_id: TypeId,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Content {
    Empty,
    Elements(Group),
    /// Character data of the given simple type.
    Simple(TypeId),
}

#[derive(Debug, Clone)]
pub(crate) struct ComplexType {
    pub content: Content,
    pub attributes: Vec<AttributeDecl>,
}

/// Primitive the value space of a simple type comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Builtin {
    String,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

impl Builtin {
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Builtin::String),
            "decimal" => Some(Builtin::Decimal),
            "boolean" => Some(Builtin::Boolean),
            "date" => Some(Builtin::Date),
            "dateTime" => Some(Builtin::DateTime),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::String => "string",
            Builtin::Decimal => "decimal",
            Builtin::Boolean => "boolean",
            Builtin::Date => "date",
            Builtin::DateTime => "dateTime",
        }
    }
}

/// Patterns declared in one derivation step. A value must match at least
/// one of them; separate steps must all be satisfied.
#[derive(Debug, Clone)]
pub(crate) struct PatternGroup {
    pub sources: Vec<String>,
    pub regex: Regex,
}

/// Restriction facets, merged down the derivation chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct Facets {
    pub patterns: Vec<PatternGroup>,
    pub enumeration: Vec<String>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub total_digits: Option<usize>,
    pub fraction_digits: Option<u32>,
    pub min_inclusive: Option<Decimal>,
    pub max_inclusive: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub(crate) struct SimpleType {
    pub builtin: Builtin,
    pub facets: Facets,
}

#[derive(Debug, Clone)]
pub(crate) enum TypeDef {
    Simple(SimpleType),
    Complex(ComplexType),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, min: usize) -> Particle {
        Particle::Element(ElementDecl {
            name: name.to_string(),
            type_id: TypeId(0),
            occurs: Occurs { min, max: Some(1) },
        })
    }

    fn node(name: &str, namespace: Option<&str>) -> Node {
        Node {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            ..Node::default()
        }
    }

    #[test]
    fn sequence_start_skips_optional_particles() {
        let group = Group {
            compositor: Compositor::Sequence,
            occurs: Occurs::ONCE,
            particles: vec![element("InstrId", 0), element("EndToEndId", 1), element("Tail", 1)],
        };
        assert!(group.can_start_with(&node("InstrId", None)));
        assert!(group.can_start_with(&node("EndToEndId", None)));
        assert!(!group.can_start_with(&node("Tail", None)));
        assert_eq!(group.first_names(), vec!["InstrId", "EndToEndId"]);
        assert!(!group.content_is_emptiable());
    }

    #[test]
    fn wildcard_namespace_constraints() {
        let other = NamespaceConstraint::Other(Some("urn:t".to_string()));
        assert!(other.admits(Some("urn:ext")));
        assert!(!other.admits(Some("urn:t")));
        assert!(!other.admits(None));

        let list = NamespaceConstraint::List(vec![None, Some("urn:ext".to_string())]);
        assert!(list.admits(None));
        assert!(list.admits(Some("urn:ext")));
        assert!(!list.admits(Some("urn:t")));

        let any = Particle::Wildcard(Wildcard {
            namespaces: NamespaceConstraint::Any,
            process: ProcessContents::Lax,
            occurs: Occurs::ONCE,
        });
        assert!(any.can_start_with(&node("Anything", Some("urn:whatever"))));
        assert!(!any.is_emptiable());
    }

    #[test]
    fn unbounded_occurs() {
        let occurs = Occurs { min: 1, max: None };
        assert!(occurs.allows_more(10_000));
        assert!(!Occurs::ONCE.allows_more(1));
    }
}
