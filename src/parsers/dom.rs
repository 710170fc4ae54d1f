//! Generic document tree consumed by the flow-tree builders.
//!
//! Markup parsing happens elsewhere; the builders only need the element structure,
//! attributes and, for every element, where its start tag and whole body sit in the
//! document. [`DomNode`] is that contract. [`Element`] is a plain owned
//! implementation that can be (de)serialized, which is how documents reach the
//! command-line tool and the test fixtures.

use std::collections::BTreeMap;

use lsp_types::Position;
use serde::{Deserialize, Serialize};

/// Read-only view of one element of a parsed document.
pub trait DomNode {
    fn tag(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child elements in document order. Text and comments are not included.
    fn children(&self) -> Vec<&Self>;

    /// Position of the `<` that opens the start tag.
    fn start(&self) -> Position;

    /// Position just past the end tag (or past `/>` for self-closed elements).
    fn end(&self) -> Position;

    /// Position just past the `>` of the start tag.
    fn open_end(&self) -> Position;

    fn is_self_closing(&self) -> bool;
}

/// An owned document element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub start: Position,
    pub end: Position,
    /// End of the start tag; defaults to `end` for self-closed elements and to the end
    /// of the start line otherwise.
    #[serde(default)]
    pub open_end: Option<Position>,
    #[serde(default)]
    pub self_closing: bool,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    /// An element spanning `start_line..=end_line` whose start tag ends on `open_end_line`.
    pub fn new(tag: impl Into<String>, start_line: u32, open_end_line: u32, end_line: u32) -> Self {
        Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            start: Position { line: start_line, character: 0 },
            end: Position { line: end_line, character: 0 },
            open_end: Some(Position { line: open_end_line, character: 0 }),
            self_closing: false,
            children: Vec::new(),
        }
    }

    /// A self-closed element on a single line.
    pub fn empty(tag: impl Into<String>, line: u32) -> Self {
        Element {
            self_closing: true,
            open_end: None,
            ..Element::new(tag, line, line, line)
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }
}

impl DomNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }

    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }

    fn open_end(&self) -> Position {
        match self.open_end {
            Some(open_end) => open_end,
            None if self.self_closing => self.end,
            None => Position { line: self.start.line, character: u32::MAX }.min(self.end),
        }
    }

    fn is_self_closing(&self) -> bool {
        self.self_closing
    }
}

/// Children of `node` whose tag matches `name` after normalization.
pub fn children_named<'a, N: DomNode>(node: &'a N, name: &str) -> Vec<&'a N> {
    let wanted = crate::ir::kind::normalize_tag(name);
    node.children()
        .into_iter()
        .filter(|c| crate::ir::kind::normalize_tag(c.tag()) == wanted)
        .collect()
}

/// First child of `node` whose tag matches `name` after normalization.
pub fn child_named<'a, N: DomNode>(node: &'a N, name: &str) -> Option<&'a N> {
    children_named(node, name).into_iter().next()
}
