//! Source tree with byte-accurate locations.
//!
//! The converter does not care how HTML is parsed, only that every element
//! knows where its start tag and end tag sit in the original string, and every
//! text run knows its own byte range. [`SourceParser`] is that seam; the
//! built-in [`HtmlSourceParser`] is a lenient tokenizer plus a small tree
//! builder that covers the implied-end-tag cases real pages rely on.
//!
//! # Example
//!
//! ```
//! use standoff::source::{HtmlSourceParser, SourceNode, SourceParser, Span};
//!
//! let tree = HtmlSourceParser::new().parse("<p>Hi</p>").unwrap();
//! let SourceNode::Element(p) = &tree.nodes[0] else { panic!() };
//! assert_eq!(p.start_tag, Span::new(0, 3));
//! assert_eq!(p.end_tag, Some(Span::new(5, 9)));
//! ```

mod tokenizer;
mod tree_builder;

pub use tokenizer::{Token, TokenKind, Tokenizer};

use crate::error::Result;

/// Half-open byte range `[start, end)` into the parsed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An element with its tag locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// Lowercased tag name.
    pub name: String,
    /// Location of `<name ...>`.
    pub start_tag: Span,
    /// Location of `</name>`, absent for void, self-closing, and implicitly
    /// closed elements.
    pub end_tag: Option<Span>,
    pub children: Vec<SourceNode>,
}

impl ElementNode {
    /// Byte range strictly between the start and end tags, if the element has
    /// an explicit end tag.
    pub fn content_span(&self) -> Option<Span> {
        self.end_tag.map(|end| Span::new(self.start_tag.end, end.start))
    }
}

/// A node of the parsed source.
///
/// Only [`Element`](SourceNode::Element) and [`Text`](SourceNode::Text)
/// participate in conversion; the other variants are kept so the tree still
/// accounts for the input, apart from whitespace ahead of the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceNode {
    Element(ElementNode),
    Text(Span),
    Comment(Span),
    Doctype(Span),
}

impl SourceNode {
    pub fn span(&self) -> Span {
        match self {
            SourceNode::Element(el) => {
                let end = el.end_tag.map_or_else(
                    || {
                        el.children
                            .last()
                            .map_or(el.start_tag.end, |c| c.span().end)
                    },
                    |t| t.end,
                );
                Span::new(el.start_tag.start, end)
            }
            SourceNode::Text(span) | SourceNode::Comment(span) | SourceNode::Doctype(span) => *span,
        }
    }
}

/// An ordered forest of source nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceTree {
    pub nodes: Vec<SourceNode>,
}

impl SourceTree {
    /// Find the first element with the given tag name (pre-order).
    pub fn find(&self, name: &str) -> Option<&ElementNode> {
        fn search<'a>(nodes: &'a [SourceNode], name: &str) -> Option<&'a ElementNode> {
            for node in nodes {
                if let SourceNode::Element(el) = node {
                    if el.name == name {
                        return Some(el);
                    }
                    if let Some(found) = search(&el.children, name) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.nodes, name)
    }
}

/// Parser collaborator: turns an HTML string into a [`SourceTree`] whose spans
/// are measured against that same string.
pub trait SourceParser {
    fn parse(&self, html: &str) -> Result<SourceTree>;
}

/// Lenient byte-level HTML parser with source locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSourceParser;

impl HtmlSourceParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for HtmlSourceParser {
    fn parse(&self, html: &str) -> Result<SourceTree> {
        Ok(tree_builder::build(html))
    }
}

/// Elements that never have content or an end tag.
pub fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is raw text up to the matching end tag.
pub fn is_raw_text(name: &str) -> bool {
    matches!(
        name,
        "script"
            | "style"
            | "textarea"
            | "title"
            | "xmp"
            | "iframe"
            | "noembed"
            | "noframes"
            | "plaintext"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> SourceTree {
        HtmlSourceParser::new().parse(html).expect("parse")
    }

    #[test]
    fn test_content_span() {
        let tree = parse("<h1>Fox</h1>");
        let h1 = tree.find("h1").expect("h1");
        assert_eq!(h1.content_span(), Some(Span::new(4, 7)));
    }

    #[test]
    fn test_void_has_no_content_span() {
        let tree = parse("<p>a<br/>b</p>");
        let br = tree.find("br").expect("br");
        assert_eq!(br.content_span(), None);
        assert!(br.children.is_empty());
    }

    #[test]
    fn test_node_span_covers_element() {
        let tree = parse("<div><p>x</p></div>");
        assert_eq!(tree.nodes[0].span(), Span::new(0, 19));
    }

    #[test]
    fn test_find_nested() {
        let tree = parse("<nav><ul><li><b>x</b></li></ul></nav>");
        let b = tree.find("b").expect("b");
        assert_eq!(b.start_tag, Span::new(13, 16));
    }
}
