//! Maps HTML elements to mark types and back.
//!
//! Tags without a mark type produce no mark but their children are still
//! walked. Tags in [`NonReadableTags`] exclude their whole subtree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic annotation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Paragraph,
    Bold,
    Italic,
}

impl MarkType {
    pub const ALL: [MarkType; 9] = [
        MarkType::Heading1,
        MarkType::Heading2,
        MarkType::Heading3,
        MarkType::Heading4,
        MarkType::Heading5,
        MarkType::Heading6,
        MarkType::Paragraph,
        MarkType::Bold,
        MarkType::Italic,
    ];

    /// Mark type for an element name, if it carries one.
    pub fn from_tag(tag: &str) -> Option<MarkType> {
        match tag {
            "h1" => Some(MarkType::Heading1),
            "h2" => Some(MarkType::Heading2),
            "h3" => Some(MarkType::Heading3),
            "h4" => Some(MarkType::Heading4),
            "h5" => Some(MarkType::Heading5),
            "h6" => Some(MarkType::Heading6),
            "p" => Some(MarkType::Paragraph),
            "b" | "strong" => Some(MarkType::Bold),
            "i" | "em" => Some(MarkType::Italic),
            _ => None,
        }
    }

    /// Tag re-emitted for this mark type during reconstruction.
    pub fn tag(self) -> &'static str {
        match self {
            MarkType::Heading1 => "h1",
            MarkType::Heading2 => "h2",
            MarkType::Heading3 => "h3",
            MarkType::Heading4 => "h4",
            MarkType::Heading5 => "h5",
            MarkType::Heading6 => "h6",
            MarkType::Paragraph => "p",
            MarkType::Bold => "b",
            MarkType::Italic => "i",
        }
    }

    /// Headings and paragraphs are block content; bold and italic are inline.
    pub fn is_block(self) -> bool {
        !matches!(self, MarkType::Bold | MarkType::Italic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkType::Heading1 => "heading1",
            MarkType::Heading2 => "heading2",
            MarkType::Heading3 => "heading3",
            MarkType::Heading4 => "heading4",
            MarkType::Heading5 => "heading5",
            MarkType::Heading6 => "heading6",
            MarkType::Paragraph => "paragraph",
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags whose whole subtree is left out of reading order and marks.
///
/// The default is the baseline set `nav, head, style, script, footer`.
/// Anything else (for instance `blockquote` or `aside`) has to be added
/// explicitly.
///
/// Tag names are matched lowercase; names given in any case (including in a
/// config file) are lowercased on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NonReadableTags(BTreeSet<String>);

impl NonReadableTags {
    pub const BASELINE: [&'static str; 5] = ["nav", "head", "style", "script", "footer"];

    pub fn baseline() -> Self {
        Self::from_tags(Self::BASELINE)
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tags.into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn with(mut self, tag: &str) -> Self {
        self.0.insert(tag.to_ascii_lowercase());
        self
    }

    pub fn without(mut self, tag: &str) -> Self {
        self.0.remove(&tag.to_ascii_lowercase());
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for NonReadableTags {
    fn from(tags: Vec<String>) -> Self {
        Self::from_tags(tags)
    }
}

impl From<NonReadableTags> for Vec<String> {
    fn from(tags: NonReadableTags) -> Self {
        tags.0.into_iter().collect()
    }
}

impl Default for NonReadableTags {
    fn default() -> Self {
        Self::baseline()
    }
}
