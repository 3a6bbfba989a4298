//! The generic element tree.
//!
//! An [`Element`] is a deep, owned copy of a parsed document element: its
//! local tag name, its attributes as ordered `(name, value)` pairs keyed by
//! their qualified name as written (`tag`, `xsi:schemaLocation`), and either
//! its text or its child elements. Each parent owns its children outright, so
//! dropping the root releases the whole subtree exactly once.
//!
//! After construction the only mutation offered is reordering one level of
//! children with [`Element::permute_children`].
//!
//! # Examples
//!
//! ```
//! use mxtool::document::Document;
//! use mxtool::Element;
//!
//! let doc = Document::parse_str(r#"<!-- exported -->
//! <collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record><controlfield tag="001">12345</controlfield></record>
//! </collection>"#).unwrap();
//!
//! let top = Element::from_document(&doc).unwrap();
//! assert!(top.is_collection());
//! assert_eq!(top.text(), None);
//!
//! let field = &top.children()[0].children()[0];
//! assert_eq!(field.attribute("tag"), Some("001"));
//! assert_eq!(field.text(), Some("12345"));
//! ```

use crate::document::{Document, Node, RawElement};
use crate::error::{MxError, Result};

/// Tag of the collection root element.
pub const COLLECTION_TAG: &str = "collection";

/// Tag of a record element.
pub const RECORD_TAG: &str = "record";

/// A generic XML element with owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Deep-copy a parsed element and everything below it.
    ///
    /// Text is copied only when the element has no child elements; an element
    /// with children has no text. Child elements keep their document order and
    /// interleaved comments and whitespace are dropped.
    #[must_use]
    pub fn build(raw: &RawElement) -> Self {
        let children: Vec<Element> = raw.child_elements().map(Element::build).collect();
        let text = if children.is_empty() {
            Some(raw.text())
        } else {
            None
        };
        let attributes = raw
            .attributes()
            .iter()
            .map(|a| (a.qualified_name(), a.value.clone()))
            .collect();

        Element {
            tag: raw.name().to_string(),
            text,
            attributes,
            children,
        }
    }

    /// Build from the first element among `nodes`, skipping the comments and
    /// whitespace that precede it.
    #[must_use]
    pub fn from_nodes(nodes: &[Node]) -> Option<Self> {
        nodes.iter().find_map(Node::as_element).map(Element::build)
    }

    /// Build from a document's root element.
    #[must_use]
    pub fn from_document(doc: &Document) -> Option<Self> {
        Self::from_nodes(doc.nodes())
    }

    /// Create an element with text and no children.
    #[must_use]
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            text: Some(text.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element with children and no text.
    ///
    /// An empty `children` vector produces an element with empty text, as
    /// parsing `<tag/>` would.
    #[must_use]
    pub fn branch(tag: impl Into<String>, children: Vec<Element>) -> Self {
        let text = if children.is_empty() {
            Some(String::new())
        } else {
            None
        };
        Element {
            tag: tag.into(),
            text,
            attributes: Vec::new(),
            children,
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Local tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Text content, or `None` when the element has children.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// True iff the element has text and it is all whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|t| t.chars().all(char::is_whitespace))
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of the first attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Direct children tagged `record`.
    pub fn records(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter(|c| c.is_record())
    }

    /// True if this element is a `record`.
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.tag == RECORD_TAG
    }

    /// True if this element is a `collection`.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.tag == COLLECTION_TAG
    }

    /// Number of elements in this subtree, itself included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Element::element_count).sum::<usize>()
    }

    /// Reorder the children so that new position `i` holds the child that
    /// was at `order[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::InvalidArgument`] if `order` is not a permutation
    /// of `0..children().len()`; the children are left untouched.
    pub fn permute_children(&mut self, order: &[usize]) -> Result<()> {
        let len = self.children.len();
        if order.len() != len {
            return Err(MxError::InvalidArgument(format!(
                "ordering has {} entries for {len} children",
                order.len()
            )));
        }
        let mut seen = vec![false; len];
        for &i in order {
            match seen.get_mut(i) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(MxError::InvalidArgument(format!(
                        "ordering is not a permutation (index {i})"
                    )));
                },
            }
        }

        let mut slots: Vec<Option<Element>> =
            std::mem::take(&mut self.children).into_iter().map(Some).collect();
        self.children = order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();
        Ok(())
    }
}
