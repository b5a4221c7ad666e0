//! JDOM to HTML reconstruction.
//!
//! Replays the reading order character by character and re-wraps the text in
//! the tags of its marks, optionally overlaying caller-supplied highlights.
//! Text outside the reading order (navigation, scripts, and so on) never
//! appears in the output.
//!
//! A mark opens immediately before the first replayed character inside its
//! range and closes immediately after the last one. Coincident opens follow
//! mark-list order and coincident closes the reverse, so properly nested
//! marks serialize as nested tags. Highlight spans are kept innermost: they
//! close before any mark tag and reopen after it.
//!
//! Marks that overlap without nesting cannot be serialized as well-formed
//! HTML; they are rendered best-effort and logged.
//!
//! # Example
//!
//! ```
//! use standoff::{UserMark, html_to_jdom, jdom_to_html};
//!
//! let jdom = html_to_jdom("<p>The fox <b>jumped</b>.</p>").unwrap();
//! let html = jdom_to_html(&jdom, &[UserMark::new(3, 9, "note")]);
//!
//! assert!(html.contains(r#"<span class="user-highlight">The fox</span>"#));
//! ```

mod plan;

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::jdom::{Jdom, Mark, UserMark};

use plan::{Plan, Replayed, replay_stream};

/// Default class for user highlights.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "user-highlight";

/// Maps user-mark labels to highlight classes.
///
/// Labels without an entry use the default class. When several user marks
/// are active on one character, their classes are joined in the order the
/// marks were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightStyles {
    pub default_class: String,
    pub classes: BTreeMap<String, String>,
}

impl Default for HighlightStyles {
    fn default() -> Self {
        Self {
            default_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            classes: BTreeMap::new(),
        }
    }
}

impl HighlightStyles {
    pub fn with_class(mut self, label: impl Into<String>, class: impl Into<String>) -> Self {
        self.classes.insert(label.into(), class.into());
        self
    }

    pub fn class_for(&self, label: &str) -> &str {
        self.classes
            .get(label)
            .map_or(self.default_class.as_str(), String::as_str)
    }

    /// Class attribute for a set of active user marks (indices in caller order).
    fn class_for_active(&self, user_marks: &[UserMark], active: &[usize]) -> Option<String> {
        let mut classes: Vec<&str> = Vec::with_capacity(active.len());
        for &i in active {
            let class = self.class_for(&user_marks[i].mark_type);
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        (!classes.is_empty()).then(|| classes.join(" "))
    }
}

/// How boundaries are located in the replayed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Indexed when the reading order is sorted by offset, scan otherwise.
    #[default]
    Auto,
    /// Check every mark against every character.
    Scan,
    /// Sorted event index; falls back to scan for unsorted reading orders.
    Indexed,
}

/// Configuration for reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructOptions {
    pub highlight: HighlightStyles,
    /// Emit `data-start`/`data-end` with each mark's source offsets.
    pub diagnostic_attributes: bool,
    /// Wrap the output in `<html><head></head><body>…</body></html>`.
    pub wrap_document: bool,
    pub strategy: Strategy,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            highlight: HighlightStyles::default(),
            diagnostic_attributes: true,
            wrap_document: false,
            strategy: Strategy::Auto,
        }
    }
}

/// Rebuilds HTML from a JDOM.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    options: ReconstructOptions,
}

impl Reconstructor {
    /// Create a Reconstructor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Reconstructor with the specified configuration.
    pub fn with_options(options: ReconstructOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Reconstruct HTML, overlaying `user_marks`.
    pub fn reconstruct(&self, jdom: &Jdom, user_marks: &[UserMark]) -> String {
        let crossing = count_crossing(jdom.marks());
        if crossing > 0 {
            tracing::warn!(
                crossing,
                "marks overlap without nesting; output may not be well-formed"
            );
        }

        let stream = replay_stream(jdom);
        let plan = self.plan(jdom, &stream, user_marks);
        let body = self.emit(jdom.marks(), &stream, &plan);

        tracing::debug!(
            chars = stream.len(),
            marks = jdom.marks().len(),
            user_marks = user_marks.len(),
            "reconstructed html"
        );

        if self.options.wrap_document {
            format!("<html><head></head><body>{body}</body></html>")
        } else {
            body
        }
    }

    fn plan(&self, jdom: &Jdom, stream: &[Replayed], user_marks: &[UserMark]) -> Plan {
        let styles = &self.options.highlight;
        let indexed = match self.options.strategy {
            Strategy::Scan => false,
            Strategy::Auto | Strategy::Indexed => {
                let ascending = jdom.is_reading_order_ascending();
                if !ascending && self.options.strategy == Strategy::Indexed {
                    tracing::debug!("reading order is not sorted by offset; using scan");
                }
                ascending
            }
        };

        if indexed {
            Plan::indexed(stream, jdom.marks(), user_marks, styles)
        } else {
            Plan::scan(stream, jdom.marks(), user_marks, styles)
        }
    }

    fn emit(&self, marks: &[Mark], stream: &[Replayed], plan: &Plan) -> String {
        let mut ctx = EmitContext {
            out: String::with_capacity(stream.len() * 2),
            highlight: None,
            diagnostic: self.options.diagnostic_attributes,
        };
        let mut opens = plan.opens.iter().peekable();
        let mut closes = plan.closes.iter().peekable();
        let mut runs = plan.highlights.iter().peekable();
        let mut wanted: Option<&str> = None;

        for (pos, replayed) in stream.iter().enumerate() {
            while let Some((_, class)) = runs.next_if(|(p, _)| *p == pos) {
                wanted = class.as_deref();
            }

            let mut opened = false;
            while let Some(&(_, m)) = opens.next_if(|(p, _)| *p == pos) {
                if !opened {
                    ctx.close_highlight();
                    opened = true;
                }
                ctx.open_mark(&marks[m]);
            }

            if ctx.highlight.as_deref() != wanted {
                ctx.close_highlight();
                if let Some(class) = wanted {
                    ctx.open_highlight(class);
                }
            }

            ctx.out.push(replayed.ch);

            let mut closed = false;
            while let Some(&(_, m)) = closes.next_if(|(p, _)| *p == pos) {
                if !closed {
                    ctx.close_highlight();
                    closed = true;
                }
                ctx.close_mark(&marks[m]);
            }

            let run_ends = runs.peek().is_some_and(|(p, _)| *p == pos + 1);
            if run_ends || pos + 1 == stream.len() {
                ctx.close_highlight();
            }
        }

        ctx.out
    }
}

struct EmitContext {
    out: String,
    /// Class of the highlight span currently open.
    highlight: Option<String>,
    diagnostic: bool,
}

impl EmitContext {
    fn open_mark(&mut self, mark: &Mark) {
        let tag = mark.mark_type.tag();
        if self.diagnostic {
            let _ = write!(
                self.out,
                "<{tag} data-start=\"{}\" data-end=\"{}\">",
                mark.start, mark.end
            );
        } else {
            let _ = write!(self.out, "<{tag}>");
        }
    }

    fn close_mark(&mut self, mark: &Mark) {
        let _ = write!(self.out, "</{}>", mark.mark_type.tag());
    }

    fn open_highlight(&mut self, class: &str) {
        let _ = write!(self.out, "<span class=\"{}\">", escape_attr(class));
        self.highlight = Some(class.to_string());
    }

    fn close_highlight(&mut self) {
        if self.highlight.take().is_some() {
            self.out.push_str("</span>");
        }
    }
}

/// Number of mark pairs that overlap without one containing the other.
fn count_crossing(marks: &[Mark]) -> usize {
    let mut sorted: Vec<&Mark> = marks.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut open: Vec<usize> = Vec::new();
    let mut crossing = 0;
    for mark in sorted {
        while open.last().is_some_and(|&end| end <= mark.start) {
            open.pop();
        }
        if let Some(&end) = open.last()
            && mark.end > end
        {
            crossing += 1;
        }
        open.push(mark.end);
    }
    crossing
}

/// Escape special characters in an attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Reconstruct HTML with the default options.
pub fn jdom_to_html(jdom: &Jdom, user_marks: &[UserMark]) -> String {
    Reconstructor::new().reconstruct(jdom, user_marks)
}
