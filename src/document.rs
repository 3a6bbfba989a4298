//! Generic parsed XML documents.
//!
//! This module adapts the `quick-xml` event reader into a small document
//! model: a [`Document`] holds top-level [`Node`]s, and every element is a
//! [`RawElement`] with its resolved namespace, its attributes, and its child
//! nodes (elements, text, and comments) in document order.
//!
//! Namespaces are resolved by `quick-xml`'s [`NsReader`]. Namespace
//! declarations (`xmlns`, `xmlns:p`) do not appear among an element's
//! attributes. XML declarations, processing
//! instructions and doctypes are dropped.
//!
//! # Examples
//!
//! ```
//! use mxtool::document::Document;
//!
//! let doc = Document::parse(br#"<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim">
//!     <marc:leader>00000nam a2200000 a 4500</marc:leader>
//! </marc:record>"#).unwrap();
//!
//! let root = doc.root().unwrap();
//! assert_eq!(root.name(), "record");
//! assert_eq!(root.namespace(), Some("http://www.loc.gov/MARC21/slim"));
//! assert_eq!(root.child_elements().count(), 1);
//! ```

use crate::error::{MxError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

/// Namespace bound to the reserved `xml` prefix.
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A node in a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its own attributes and children.
    Element(RawElement),
    /// Character data, with entities already expanded.
    Text(String),
    /// A comment body.
    Comment(String),
}

impl Node {
    /// Returns the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&RawElement> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An attribute as it appeared on a parsed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Local name, without prefix
    pub name: String,
    /// Namespace prefix, if the attribute was qualified
    pub prefix: Option<String>,
    /// Namespace the prefix resolved to
    pub namespace: Option<String>,
    /// Unescaped attribute value
    pub value: String,
}

impl RawAttribute {
    /// The name as written: `prefix:name`, or just `name` when unprefixed.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// An element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    name: String,
    prefix: Option<String>,
    namespace: Option<String>,
    attributes: Vec<RawAttribute>,
    children: Vec<Node>,
}

impl RawElement {
    /// Local element name, without prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix the element was written with, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Namespace the element's name resolved to.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attributes in document order, namespace declarations excluded.
    #[must_use]
    pub fn attributes(&self) -> &[RawAttribute] {
        &self.attributes
    }

    /// All child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &RawElement> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns true if at least one child is an element.
    #[must_use]
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Concatenation of the element's direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a complete document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::Parse`] if the input is not well formed, uses an
    /// unbound namespace prefix, has more than one root element, or has none.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut builder = TreeBuilder::default();

        loop {
            let (resolved, event) = match reader.read_resolved_event_into(&mut buf) {
                Ok(pair) => pair,
                Err(e) => return Err(parse_error(reader.buffer_position(), &e)),
            };
            let namespace = namespace_uri(resolved)?;

            match event {
                Event::Start(start) => builder.open(raw_element(&reader, &start, namespace)?),
                Event::Empty(start) => {
                    builder.open(raw_element(&reader, &start, namespace)?);
                    builder.close()?;
                },
                Event::End(_) => builder.close()?,
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| parse_error(reader.buffer_position(), &e))?;
                    builder.push(Node::Text(text.into_owned()))?;
                },
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    builder.push(Node::Text(text))?;
                },
                Event::Comment(comment) => {
                    builder.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()))?;
                },
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {},
                Event::Eof => break,
            }
            buf.clear();
        }

        let document = builder.finish()?;
        debug!(nodes = document.nodes.len(), "parsed document");
        Ok(document)
    }

    /// Parse a complete document from a string.
    ///
    /// # Errors
    ///
    /// See [`Document::parse`].
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Top-level nodes: the root element plus any surrounding comments.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The document's root element.
    #[must_use]
    pub fn root(&self) -> Option<&RawElement> {
        self.nodes.iter().find_map(Node::as_element)
    }
}

fn parse_error(position: usize, err: &quick_xml::Error) -> MxError {
    MxError::Parse(format!("at byte {position}: {err}"))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| MxError::Parse(format!("invalid UTF-8 in name: {e}")))
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => utf8(uri).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NS.to_string())),
        ResolveResult::Unknown(prefix) => Err(MxError::Parse(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Copy a start tag, resolving its attributes against the reader's current
/// namespace scope.
fn raw_element<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<RawElement> {
    let qname = start.name();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        // Unprefixed attributes resolve to no namespace.
        let (resolved, local) = reader.resolve_attribute(attr.key);
        attributes.push(RawAttribute {
            name: utf8(local.as_ref())?,
            prefix: attr.key.prefix().map(|p| utf8(p.as_ref())).transpose()?,
            namespace: namespace_uri(resolved)?,
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(RawElement {
        name: utf8(qname.local_name().as_ref())?,
        prefix: qname.prefix().map(|p| utf8(p.as_ref())).transpose()?,
        namespace,
        attributes,
        children: Vec::new(),
    })
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<RawElement>,
    nodes: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, element: RawElement) {
        self.stack.push(element);
    }

    fn close(&mut self) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| MxError::Parse("closing tag without matching opening tag".to_string()))?;
        self.push(Node::Element(element))
    }

    fn push(&mut self, node: Node) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(node);
            return Ok(());
        }
        match &node {
            Node::Element(element) if self.nodes.iter().any(|n| n.as_element().is_some()) => {
                return Err(MxError::Parse(format!(
                    "second root element <{}>",
                    element.name()
                )));
            },
            Node::Text(text) if !text.trim().is_empty() => {
                return Err(MxError::Parse("text outside the root element".to_string()));
            },
            Node::Text(_) => return Ok(()),
            _ => {},
        }
        self.nodes.push(node);
        Ok(())
    }

    fn finish(self) -> Result<Document> {
        if let Some(open) = self.stack.last() {
            return Err(MxError::Parse(format!(
                "unexpected end of input inside <{}>",
                open.name()
            )));
        }
        if !self.nodes.iter().any(|n| n.as_element().is_some()) {
            return Err(MxError::Parse("document has no root element".to_string()));
        }
        Ok(Document { nodes: self.nodes })
    }
}
