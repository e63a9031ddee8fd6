//! Namespace-aware XML tree reader.
//!
//! Reads a whole document into [`Node`]s with resolved element namespaces.
//! Comments, processing instructions and the prolog are dropped. Text is
//! kept exactly as written (entity references resolved) so that the schema
//! checker can apply each type's own whitespace rule.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The document could not be read as XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct XmlParseError {
    pub position: u64,
    pub message: String,
}

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Local name, without prefix.
    pub name: String,
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    /// Attributes under their qualified names, namespace declarations
    /// included, in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data of this element, untrimmed.
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Namespace declarations made on this element, as `(prefix, uri)`.
    /// The default namespace has no prefix.
    pub fn declarations(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((None, value.as_str()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (Some(prefix), value.as_str()))
            }
        })
    }
}

/// In-scope prefix bindings, innermost last.
#[derive(Default)]
struct Scopes {
    frames: Vec<Vec<(Option<String>, String)>>,
}

impl Scopes {
    fn push(&mut self, node: &Node) {
        let frame = node
            .declarations()
            .map(|(prefix, uri)| (prefix.map(str::to_string), uri.to_string()))
            .collect();
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            // An empty `xmlns=""` undeclares the default namespace.
            .filter(|uri| !uri.is_empty())
    }
}

/// Parses `text` into its root element.
pub fn parse(text: &str) -> Result<Node, XmlParseError> {
    let mut reader = Reader::from_str(text);
    let mut scopes = Scopes::default();
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| XmlParseError {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;
        match event {
            Event::Start(start) => {
                let node = open_element(&start, &mut scopes, position)?;
                stack.push(node);
            }
            Event::Empty(start) => {
                let node = open_element(&start, &mut scopes, position)?;
                scopes.pop();
                attach(node, &mut stack, &mut root, position)?;
            }
            Event::End(_) => {
                scopes.pop();
                let Some(node) = stack.pop() else {
                    return Err(parse_error(position, "unexpected closing tag"));
                };
                attach(node, &mut stack, &mut root, position)?;
            }
            Event::Text(content) => {
                let raw = decode(&content, position)?;
                let text = unescape(&raw).map_err(|e| parse_error(position, &e.to_string()))?;
                append_text(&mut stack, &text, position)?;
            }
            Event::CData(content) => {
                let raw = decode(&content, position)?;
                append_text(&mut stack, &raw, position)?;
            }
            Event::GeneralRef(reference) => {
                let name = decode(&reference, position)?;
                let text = unescape(&format!("&{name};"))
                    .map_err(|e| parse_error(position, &e.to_string()))?
                    .into_owned();
                append_text(&mut stack, &text, position)?;
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(parse_error(
            reader.buffer_position() as u64,
            "document ended inside an open element",
        ));
    }
    root.ok_or_else(|| parse_error(reader.buffer_position() as u64, "document has no root element"))
}

fn open_element(
    start: &BytesStart<'_>,
    scopes: &mut Scopes,
    position: u64,
) -> Result<Node, XmlParseError> {
    let qname = start.name();
    let qualified = decode(qname.as_ref(), position)?;
    let (prefix, name) = match qualified.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, qualified.to_string()),
    };

    let mut node = Node {
        name,
        prefix,
        ..Node::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| parse_error(position, &e.to_string()))?;
        let key = decode(attribute.key.as_ref(), position)?;
        let raw = decode(&attribute.value, position)?;
        let value = unescape(&raw).map_err(|e| parse_error(position, &e.to_string()))?;
        node.attributes.push((key.to_string(), value.into_owned()));
    }

    scopes.push(&node);
    node.namespace = scopes.resolve(node.prefix.as_deref());
    if node.prefix.is_some() && node.namespace.is_none() {
        return Err(parse_error(
            position,
            &format!("undeclared namespace prefix in <{qualified}>"),
        ));
    }
    Ok(node)
}

fn attach(
    node: Node,
    stack: &mut [Node],
    root: &mut Option<Node>,
    position: u64,
) -> Result<(), XmlParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(parse_error(position, "document has more than one root element")),
    }
    Ok(())
}

fn append_text(stack: &mut [Node], text: &str, position: u64) -> Result<(), XmlParseError> {
    match stack.last_mut() {
        Some(node) => node.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(parse_error(position, "text outside the root element")),
    }
    Ok(())
}

fn decode(bytes: &[u8], position: u64) -> Result<Cow<'_, str>, XmlParseError> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| parse_error(position, &e.to_string()))
}

fn parse_error(position: u64, message: &str) -> XmlParseError {
    XmlParseError {
        position,
        message: message.to_string(),
    }
}
