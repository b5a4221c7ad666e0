//! Assemble tokens into a [`SourceTree`].
//!
//! A stack of open elements, closed either by a matching end tag (which
//! records the end-tag span) or implicitly (which leaves it unset). The
//! implied-end-tag rules cover paragraphs, list items, definition terms and
//! headings; everything else nests exactly as written.
//!
//! Until body content appears, metadata elements (`title`, `meta`, `style`,
//! ...) at the top level go into a `head`, implied with a zero-length start
//! tag if the document does not write one. Whitespace ahead of the head is
//! dropped.

use super::tokenizer::{TokenKind, Tokenizer};
use super::{ElementNode, SourceNode, SourceTree, Span, is_void};

/// Start tags that close an open `<p>`.
fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hgroup"
            | "hr"
            | "li"
            | "dd"
            | "dt"
            | "main"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Elements that belong in the document head.
fn is_head_only(name: &str) -> bool {
    matches!(
        name,
        "title" | "base" | "link" | "meta" | "style" | "script" | "noscript"
    )
}

fn is_html_whitespace(text: &str) -> bool {
    text.bytes()
        .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\x0c' | b'\r'))
}

/// Elements that stop the search for an implicitly closed element.
fn is_scope_boundary(name: &str) -> bool {
    matches!(
        name,
        "button" | "table" | "td" | "th" | "caption" | "marquee" | "object" | "template" | "html"
    )
}

struct TreeBuilder<'a> {
    src: &'a str,
    root: Vec<SourceNode>,
    open: Vec<ElementNode>,
    /// No body content has been seen yet.
    before_body: bool,
    /// A `head` (written or implied) has been opened.
    head_seen: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            root: Vec::new(),
            open: Vec::new(),
            before_body: true,
            head_seen: false,
        }
    }

    /// Current node is the document root or `<html>`.
    fn at_top_level(&self) -> bool {
        self.open.last().is_none_or(|el| el.name == "html")
    }

    /// Body content is starting: leave the head if it is the current node.
    fn enter_body(&mut self) {
        self.before_body = false;
        if self.open.last().is_some_and(|el| el.name == "head") {
            self.pop(None);
        }
    }

    fn text(&mut self, span: Span) {
        if self.before_body {
            let in_head = self.open.last().is_some_and(|el| el.name == "head");
            if is_html_whitespace(&self.src[span.start..span.end]) {
                if self.at_top_level() && !self.head_seen {
                    return;
                }
            } else if in_head || self.at_top_level() {
                self.enter_body();
            }
        }
        self.append(SourceNode::Text(span));
    }

    fn append(&mut self, node: SourceNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn pop(&mut self, end_tag: Option<Span>) {
        if let Some(mut el) = self.open.pop() {
            el.end_tag = end_tag;
            self.append(SourceNode::Element(el));
        }
    }

    /// Index of the innermost open element matching `pred`, searching no
    /// further than the first element matching `stop`.
    fn find_open(&self, pred: impl Fn(&str) -> bool, stop: impl Fn(&str) -> bool) -> Option<usize> {
        for (i, el) in self.open.iter().enumerate().rev() {
            if pred(&el.name) {
                return Some(i);
            }
            if stop(&el.name) {
                return None;
            }
        }
        None
    }

    /// Implicitly close everything from `index` up.
    fn close_from(&mut self, index: usize) {
        while self.open.len() > index {
            self.pop(None);
        }
    }

    fn in_foreign_content(&self) -> bool {
        self.open
            .iter()
            .any(|el| el.name == "svg" || el.name == "math")
    }

    fn start_tag(&mut self, name: String, self_closing: bool, span: Span) {
        if self.before_body {
            let in_head = self.open.last().is_some_and(|el| el.name == "head");
            match name.as_str() {
                "html" => {}
                "head" => self.head_seen = true,
                _ if is_head_only(&name) => {
                    if self.at_top_level() {
                        self.open.push(ElementNode {
                            name: "head".to_string(),
                            start_tag: Span::new(span.start, span.start),
                            end_tag: None,
                            children: Vec::new(),
                        });
                        self.head_seen = true;
                    }
                }
                _ if in_head || self.at_top_level() => self.enter_body(),
                _ => {}
            }
        }

        if closes_paragraph(&name)
            && let Some(i) = self.find_open(|n| n == "p", is_scope_boundary)
        {
            self.close_from(i);
        }

        match name.as_str() {
            "li" => {
                let list = |n: &str| matches!(n, "ul" | "ol") || is_scope_boundary(n);
                if let Some(i) = self.find_open(|n| n == "li", list) {
                    self.close_from(i);
                }
            }
            "dt" | "dd" => {
                if let Some(i) = self.find_open(
                    |n| matches!(n, "dt" | "dd"),
                    |n| n == "dl" || is_scope_boundary(n),
                ) {
                    self.close_from(i);
                }
            }
            _ if is_heading(&name) => {
                if self.open.last().is_some_and(|el| is_heading(&el.name)) {
                    self.pop(None);
                }
            }
            _ => {}
        }

        let closes_now = is_void(&name)
            || (self_closing && (self.in_foreign_content() || name == "svg" || name == "math"));

        self.open.push(ElementNode {
            name,
            start_tag: span,
            end_tag: None,
            children: Vec::new(),
        });

        if closes_now {
            self.pop(None);
        }
    }

    fn end_tag(&mut self, name: &str, span: Span) {
        let matches_open = |el: &ElementNode| {
            el.name == name || (is_heading(name) && is_heading(&el.name))
        };
        let Some(i) = self.open.iter().rposition(matches_open) else {
            tracing::trace!(tag = name, offset = span.start, "ignoring unmatched end tag");
            return;
        };
        self.close_from(i + 1);
        self.pop(Some(span));
    }

    fn finish(mut self) -> SourceTree {
        self.close_from(0);
        SourceTree { nodes: self.root }
    }
}

/// Parse `html` into a source tree.
pub(super) fn build(html: &str) -> SourceTree {
    let mut builder = TreeBuilder::new(html);

    for token in Tokenizer::new(html) {
        match token.kind {
            TokenKind::StartTag { name, self_closing } => {
                builder.start_tag(name, self_closing, token.span)
            }
            TokenKind::EndTag { name } => builder.end_tag(&name, token.span),
            TokenKind::Text => builder.text(token.span),
            TokenKind::Comment => builder.append(SourceNode::Comment(token.span)),
            TokenKind::Doctype => builder.append(SourceNode::Doctype(token.span)),
        }
    }

    builder.finish()
}
