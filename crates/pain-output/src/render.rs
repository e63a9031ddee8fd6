//! Template rendering interface and the tree serializer.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use pain_model::{AssembledDocument, XmlElement};

use crate::error::RenderError;

/// Produces the serialized form of an assembled document.
///
/// Implementations must be pure: the same document always renders to the
/// same bytes. Structural properties such as counts and ordering are fixed
/// by the assembler before a renderer sees the tree.
pub trait TemplateRenderer {
    fn render(&self, document: &AssembledDocument) -> Result<Vec<u8>, RenderError>;
}

/// Serializes the tree as UTF-8 XML with an XML declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlTreeRenderer {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
}

impl Default for XmlTreeRenderer {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl TemplateRenderer for XmlTreeRenderer {
    fn render(&self, document: &AssembledDocument) -> Result<Vec<u8>, RenderError> {
        let mut buffer = Vec::new();
        {
            let mut xml = if self.indent == 0 {
                Writer::new(&mut buffer)
            } else {
                Writer::new_with_indent(&mut buffer, b' ', self.indent)
            };
            xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            write_element(&mut xml, &document.root)?;
        }
        buffer.push(b'\n');
        Ok(buffer)
    }
}

fn write_element<W: Write>(xml: &mut Writer<W>, element: &XmlElement) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        match element.text.as_deref() {
            Some(text) => {
                xml.write_event(Event::Start(start))?;
                xml.write_event(Event::Text(BytesText::new(text)))?;
                xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
            }
            None => xml.write_event(Event::Empty(start))?,
        }
        return Ok(());
    }

    xml.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
