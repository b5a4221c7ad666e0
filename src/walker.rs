//! Source tree walk producing marks and reading order.
//!
//! The walk threads a `readable` flag top-down. Once an element in the
//! non-readable set is entered, the flag stays false for its whole subtree.
//! Reading-order indices come from a [`ReadingCursor`] owned by the walker,
//! so each conversion numbers its entries from zero.

use crate::classify::{MarkType, NonReadableTags};
use crate::jdom::{Mark, ReadingOrderEntry};
use crate::source::{ElementNode, SourceNode, Span};

/// Hands out consecutive reading-order indices.
#[derive(Debug, Default)]
pub struct ReadingCursor {
    next: usize,
}

impl ReadingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index, then advance.
    pub fn advance(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Marks and reading order collected by a walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkOutput {
    pub marks: Vec<Mark>,
    pub reading_order: Vec<ReadingOrderEntry>,
}

pub struct Walker<'a> {
    non_readable: &'a NonReadableTags,
    cursor: ReadingCursor,
    out: WalkOutput,
}

impl<'a> Walker<'a> {
    pub fn new(non_readable: &'a NonReadableTags) -> Self {
        Self {
            non_readable,
            cursor: ReadingCursor::new(),
            out: WalkOutput::default(),
        }
    }

    /// Walk a sibling sequence in document order.
    pub fn walk(&mut self, nodes: &[SourceNode], readable: bool) {
        for node in nodes {
            match node {
                SourceNode::Element(el) => self.element(el, readable),
                SourceNode::Text(span) => {
                    if readable {
                        self.text(*span);
                    }
                }
                SourceNode::Comment(_) | SourceNode::Doctype(_) => {}
            }
        }
    }

    fn element(&mut self, el: &ElementNode, readable: bool) {
        if readable
            && let Some(mark_type) = MarkType::from_tag(&el.name)
            && let Some(content) = el.content_span()
        {
            self.out
                .marks
                .push(Mark::new(mark_type, content.start, content.end));
        }

        let child_readable = readable && !self.non_readable.contains(&el.name);
        if readable && !child_readable {
            tracing::trace!(
                tag = %el.name,
                offset = el.start_tag.start,
                "excluding subtree from reading order"
            );
        }

        self.walk(&el.children, child_readable);
    }

    fn text(&mut self, span: Span) {
        let index = self.cursor.advance();
        self.out.reading_order.push(ReadingOrderEntry {
            start: span.start,
            end: span.end,
            index,
        });
    }

    pub fn finish(self) -> WalkOutput {
        self.out
    }
}

/// Walk a whole forest starting readable.
pub fn walk(nodes: &[SourceNode], non_readable: &NonReadableTags) -> WalkOutput {
    let mut walker = Walker::new(non_readable);
    walker.walk(nodes, true);
    walker.finish()
}
