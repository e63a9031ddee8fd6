//! Instance document checks against a compiled schema.
//!
//! Content models are matched greedily. pain.001 content models are
//! deterministic, so a greedy match assigns every child the same
//! declaration a full automaton would. An element that fits nowhere in its
//! parent's model is reported and skipped, and matching carries on with
//! its siblings, so one stray element does not hide later problems.
//!
//! An element matched by an `xs:any` is checked against a global
//! declaration of the same name when one exists. Under `skip` nothing
//! beyond well-formedness is required of it.

use pain_model::ValidationReport;

use crate::xml::Node;

use super::CompiledSchema;
use super::facets::check_value;
use super::model::{
    AttributeDecl, Compositor, Content, ElementDecl, Group, Particle, ProcessContents, TypeDef,
    TypeId, Wildcard,
};

pub(crate) fn check_document(schema: &CompiledSchema, root: &Node) -> ValidationReport {
    let mut report = ValidationReport::default();
    let path = format!("/{}", root.name);

    match schema.roots.iter().find(|decl| decl.name == root.name) {
        Some(decl) => {
            if root.namespace != schema.target_namespace {
                report.push(
                    &path,
                    namespace_message(root.namespace.as_deref(), schema.target_namespace.as_deref()),
                );
            }
            let mut checker = Checker {
                schema,
                report: &mut report,
            };
            checker.element(root, decl.type_id, &path);
        }
        None => report.push(
            &path,
            format!("'{}' is not a document element of this schema", root.name),
        ),
    }
    report
}

struct Checker<'a> {
    schema: &'a CompiledSchema,
    report: &'a mut ValidationReport,
}

impl Checker<'_> {
    fn element(&mut self, node: &Node, type_id: TypeId, path: &str) {
        let schema = self.schema;
        match schema.type_def(type_id) {
            TypeDef::Simple(simple) => {
                self.attributes(node, &[], path);
                if node.children.is_empty() {
                    for problem in check_value(simple, &node.text) {
                        self.report.push(path, problem);
                    }
                } else {
                    self.report.push(path, "simple-typed element contains child elements");
                }
            }
            TypeDef::Complex(complex) => {
                self.attributes(node, &complex.attributes, path);
                match &complex.content {
                    Content::Empty => {
                        if !node.children.is_empty() || !node.text.trim().is_empty() {
                            self.report.push(path, "element must be empty");
                        }
                    }
                    Content::Simple(value_type) => {
                        if node.children.is_empty() {
                            self.value(*value_type, &node.text, path);
                        } else {
                            self.report.push(path, "simple-content element contains child elements");
                        }
                    }
                    Content::Elements(group) => {
                        if !node.text.trim().is_empty() {
                            self.report.push(path, "character data is not allowed here");
                        }
                        self.children(node, group, path);
                    }
                }
            }
        }
    }

    fn value(&mut self, type_id: TypeId, text: &str, path: &str) {
        if let TypeDef::Simple(simple) = self.schema.type_def(type_id) {
            for problem in check_value(simple, text) {
                self.report.push(path, problem);
            }
        }
    }

    fn attributes(&mut self, node: &Node, declared: &[AttributeDecl], path: &str) {
        for decl in declared {
            let attribute_path = format!("{path}/@{}", decl.name);
            match node.attribute(&decl.name) {
                Some(value) => self.value(decl.type_id, value, &attribute_path),
                None if decl.required => self.report.push(
                    attribute_path,
                    format!("required attribute '{}' is missing", decl.name),
                ),
                None => {}
            }
        }
        // Namespace declarations and qualified attributes such as
        // xsi:schemaLocation are not checked.
        for (name, _) in &node.attributes {
            if name == "xmlns" || name.contains(':') {
                continue;
            }
            if !declared.iter().any(|decl| decl.name == *name) {
                self.report.push(
                    format!("{path}/@{name}"),
                    format!("attribute '{name}' is not allowed"),
                );
            }
        }
    }

    fn children(&mut self, node: &Node, group: &Group, path: &str) {
        let mut matcher = Matcher::new(&node.children);
        matcher.group(group, true);
        for message in matcher.missing {
            self.report.push(path, message);
        }

        let schema = self.schema;
        for (index, child) in node.children.iter().enumerate() {
            let child_path = child_path(node, index, path);
            match matcher.assigned[index] {
                Some(Assigned::Declared(type_id)) => {
                    if schema.qualified_elements && child.namespace != schema.target_namespace {
                        self.report.push(
                            &child_path,
                            namespace_message(
                                child.namespace.as_deref(),
                                schema.target_namespace.as_deref(),
                            ),
                        );
                    }
                    self.element(child, type_id, &child_path);
                }
                Some(Assigned::Wildcard(process)) => self.wildcard(child, process, &child_path),
                None => self
                    .report
                    .push(child_path, format!("unexpected element '{}'", child.name)),
            }
        }
    }

    fn wildcard(&mut self, node: &Node, process: ProcessContents, path: &str) {
        if process == ProcessContents::Skip {
            return;
        }
        let schema = self.schema;
        let decl = schema
            .roots
            .iter()
            .find(|decl| decl.name == node.name)
            .filter(|_| node.namespace == schema.target_namespace);
        match (decl, process) {
            (Some(decl), _) => self.element(node, decl.type_id, path),
            (None, ProcessContents::Strict) => self.report.push(
                path,
                format!("no declaration for element '{}'", node.name),
            ),
            (None, _) => {}
        }
    }
}

/// What a child element was matched against.
#[derive(Debug, Clone, Copy)]
enum Assigned {
    Declared(TypeId),
    Wildcard(ProcessContents),
}

/// Assigns declarations to a run of sibling elements.
struct Matcher<'n> {
    children: &'n [Node],
    pos: usize,
    assigned: Vec<Option<Assigned>>,
    missing: Vec<String>,
}

impl<'n> Matcher<'n> {
    fn new(children: &'n [Node]) -> Self {
        Self {
            children,
            pos: 0,
            assigned: vec![None; children.len()],
            missing: Vec::new(),
        }
    }

    fn current(&self) -> Option<&'n Node> {
        self.children.get(self.pos)
    }

    fn current_name(&self) -> Option<&'n str> {
        self.current().map(|child| child.name.as_str())
    }

    /// `skip_unknown` is set for a type's outermost group only; there no
    /// enclosing model could still claim a child this group cannot place.
    fn group(&mut self, group: &Group, skip_unknown: bool) {
        let mut count = 0;
        while group.occurs.allows_more(count) {
            let starts = self
                .current()
                .is_some_and(|child| group.can_start_with(child));
            if count >= group.occurs.min && !starts {
                break;
            }
            let before = self.pos;
            match group.compositor {
                Compositor::Sequence => self.sequence(group, skip_unknown),
                Compositor::Choice => self.choice(group),
            }
            count += 1;
            if self.pos == before {
                break;
            }
        }
    }

    fn sequence(&mut self, group: &Group, skip_unknown: bool) {
        for (index, particle) in group.particles.iter().enumerate() {
            if skip_unknown {
                self.skip_unplaceable(&group.particles[index..]);
            }
            self.particle(particle);
        }
    }

    fn choice(&mut self, group: &Group) {
        let chosen = self.current().and_then(|child| {
            group
                .particles
                .iter()
                .find(|particle| particle.can_start_with(child))
        });
        match chosen {
            Some(particle) => self.particle(particle),
            None if !group.content_is_emptiable() => {
                let names: Vec<String> = group
                    .first_names()
                    .into_iter()
                    .map(|name| format!("'{name}'"))
                    .collect();
                self.missing
                    .push(format!("missing one of {}", names.join(", ")));
            }
            None => {}
        }
    }

    fn particle(&mut self, particle: &Particle) {
        match particle {
            Particle::Element(decl) => self.element(decl),
            Particle::Group(group) => self.group(group, false),
            Particle::Wildcard(wildcard) => self.wildcard(wildcard),
        }
    }

    fn wildcard(&mut self, wildcard: &Wildcard) {
        let mut count = 0;
        while wildcard.occurs.allows_more(count)
            && self
                .current()
                .is_some_and(|child| wildcard.namespaces.admits(child.namespace.as_deref()))
        {
            self.assigned[self.pos] = Some(Assigned::Wildcard(wildcard.process));
            self.pos += 1;
            count += 1;
        }
        if count < wildcard.occurs.min {
            self.missing.push(format!(
                "expected at least {} wildcard element(s), found {count}",
                wildcard.occurs.min
            ));
        }
    }

    fn element(&mut self, decl: &ElementDecl) {
        let mut count = 0;
        while decl.occurs.allows_more(count) && self.current_name() == Some(decl.name.as_str()) {
            self.assigned[self.pos] = Some(Assigned::Declared(decl.type_id));
            self.pos += 1;
            count += 1;
        }
        if count < decl.occurs.min {
            let message = if decl.occurs.min == 1 {
                format!("missing required element '{}'", decl.name)
            } else {
                format!(
                    "expected at least {} '{}' elements, found {count}",
                    decl.occurs.min, decl.name
                )
            };
            self.missing.push(message);
        }
    }

    /// Steps over children that no remaining particle can start with.
    /// They stay unassigned and are reported as unexpected.
    fn skip_unplaceable(&mut self, remaining: &[Particle]) {
        while let Some(child) = self.current() {
            if remaining.iter().any(|particle| particle.can_start_with(child)) {
                break;
            }
            self.pos += 1;
        }
    }
}

/// `parent/Name`, with a 1-based index when the name repeats among
/// siblings.
fn child_path(parent: &Node, index: usize, parent_path: &str) -> String {
    let name = parent.children[index].name.as_str();
    let same_name = parent.children.iter().filter(|child| child.name == name).count();
    if same_name > 1 {
        let ordinal = parent.children[..index]
            .iter()
            .filter(|child| child.name == name)
            .count()
            + 1;
        format!("{parent_path}/{name}[{ordinal}]")
    } else {
        format!("{parent_path}/{name}")
    }
}

fn namespace_message(found: Option<&str>, expected: Option<&str>) -> String {
    format!(
        "element is in namespace '{}', expected '{}'",
        found.unwrap_or(""),
        expected.unwrap_or("")
    )
}
