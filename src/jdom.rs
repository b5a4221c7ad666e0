//! The annotated document model.
//!
//! A [`Jdom`] is an unmodified copy of the source HTML plus two offset-based
//! views over it: semantic [`Mark`]s and the filtered [`ReadingOrderEntry`]
//! list. All offsets are byte offsets into `raw_content`.
//!
//! Invariants are checked once, when the value is built (by [`Jdom::new`] or
//! by deserialization), so every accessor can slice the source freely.

use serde::{Deserialize, Serialize};

use crate::classify::MarkType;
use crate::error::{Error, Result};

/// A semantic annotation over `raw_content[start..end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    pub start: usize,
    pub end: usize,
}

impl Mark {
    pub fn new(mark_type: MarkType, start: usize, end: usize) -> Self {
        Self {
            mark_type,
            start,
            end,
        }
    }

    /// Whether the byte at `offset` lies inside the mark.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True when the two ranges intersect but neither contains the other.
    pub fn crosses(&self, other: &Mark) -> bool {
        let intersects = self.start < other.end && other.start < self.end;
        let nested = (self.start <= other.start && other.end <= self.end)
            || (other.start <= self.start && self.end <= other.end);
        intersects && !nested
    }
}

/// One readable text run, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadingOrderEntry {
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

/// A caller-supplied highlight, applied only during reconstruction.
///
/// Unlike marks, the range is inclusive of `end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserMark {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "markType", default)]
    pub mark_type: String,
}

impl UserMark {
    pub fn new(start: usize, end: usize, mark_type: impl Into<String>) -> Self {
        Self {
            start,
            end,
            mark_type: mark_type.into(),
        }
    }

    pub fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Source text plus marks plus reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "JdomRecord")]
pub struct Jdom {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    raw_content: String,
    marks: Vec<Mark>,
    reading_order: Vec<ReadingOrderEntry>,
}

/// Unchecked wire shape of a [`Jdom`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JdomRecord {
    #[serde(default)]
    url: Option<String>,
    raw_content: String,
    #[serde(default)]
    marks: Vec<Mark>,
    #[serde(default)]
    reading_order: Vec<ReadingOrderEntry>,
}

impl TryFrom<JdomRecord> for Jdom {
    type Error = Error;

    fn try_from(record: JdomRecord) -> Result<Self> {
        let jdom = Jdom::new(record.raw_content, record.marks, record.reading_order)?;
        Ok(match record.url {
            Some(url) => jdom.with_url(url),
            None => jdom,
        })
    }
}

impl Jdom {
    /// Build a JDOM, checking every offset against `raw_content`.
    pub fn new(
        raw_content: String,
        marks: Vec<Mark>,
        reading_order: Vec<ReadingOrderEntry>,
    ) -> Result<Self> {
        for mark in &marks {
            check_range(&raw_content, "mark", mark.start, mark.end)?;
        }
        for (position, entry) in reading_order.iter().enumerate() {
            check_range(&raw_content, "reading order entry", entry.start, entry.end)?;
            if entry.index != position {
                return Err(Error::ReadingOrder {
                    position,
                    found: entry.index,
                });
            }
        }

        Ok(Self {
            url: None,
            raw_content,
            marks,
            reading_order,
        })
    }

    /// Attach the source URL used as the persistence key.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn reading_order(&self) -> &[ReadingOrderEntry] {
        &self.reading_order
    }

    /// Source text covered by one reading-order entry.
    pub fn entry_text(&self, entry: &ReadingOrderEntry) -> &str {
        &self.raw_content[entry.start..entry.end]
    }

    /// Source text covered by a mark.
    pub fn mark_text(&self, mark: &Mark) -> &str {
        &self.raw_content[mark.start..mark.end]
    }

    /// The readable text: every reading-order slice, concatenated in order.
    pub fn to_text(&self) -> String {
        let len = self.reading_order.iter().map(|e| e.end - e.start).sum();
        let mut text = String::with_capacity(len);
        for entry in &self.reading_order {
            text.push_str(self.entry_text(entry));
        }
        text
    }

    /// Whether reading-order entries are non-overlapping and sorted by offset.
    ///
    /// Always true for JDOMs produced by conversion.
    pub fn is_reading_order_ascending(&self) -> bool {
        self.reading_order
            .windows(2)
            .all(|pair| pair[0].end <= pair[1].start)
    }
}

fn check_range(src: &str, what: &'static str, start: usize, end: usize) -> Result<()> {
    if start > end {
        return Err(Error::InvalidSpan {
            what,
            start,
            end,
            reason: "start is after end",
        });
    }
    if end > src.len() {
        return Err(Error::OffsetOutOfBounds {
            what,
            offset: end,
            len: src.len(),
        });
    }
    if !src.is_char_boundary(start) || !src.is_char_boundary(end) {
        return Err(Error::InvalidSpan {
            what,
            start,
            end,
            reason: "not on a character boundary",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: usize, end: usize, index: usize) -> ReadingOrderEntry {
        ReadingOrderEntry { start, end, index }
    }

    #[test]
    fn test_to_text_concatenates_entries() {
        let jdom = Jdom::new(
            "<p>ab</p><p>cd</p>".to_string(),
            vec![],
            vec![entry(3, 5, 0), entry(12, 14, 1)],
        )
        .unwrap();
        assert_eq!(jdom.to_text(), "abcd");
        assert!(jdom.is_reading_order_ascending());
    }

    #[test]
    fn test_rejects_out_of_bounds_mark() {
        let err = Jdom::new(
            "<p>x</p>".to_string(),
            vec![Mark::new(MarkType::Paragraph, 3, 40)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::OffsetOutOfBounds {
                offset: 40,
                len: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_entry() {
        let err = Jdom::new("abc".to_string(), vec![], vec![entry(2, 1, 0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { .. }));
    }

    #[test]
    fn test_rejects_split_character() {
        let err = Jdom::new("é".to_string(), vec![], vec![entry(0, 1, 0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { .. }));
    }

    #[test]
    fn test_rejects_index_gap() {
        let err = Jdom::new("abcd".to_string(), vec![], vec![entry(0, 1, 0), entry(2, 3, 2)])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ReadingOrder {
                position: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_json_shape() {
        let jdom = Jdom::new(
            "<b>x</b>".to_string(),
            vec![Mark::new(MarkType::Bold, 3, 4)],
            vec![entry(3, 4, 0)],
        )
        .unwrap()
        .with_url("https://example.com/");
        let value = serde_json::to_value(&jdom).unwrap();
        assert_eq!(value["url"], "https://example.com/");
        assert_eq!(value["rawContent"], "<b>x</b>");
        assert_eq!(value["marks"][0]["type"], "bold");
        assert_eq!(value["readingOrder"][0]["index"], 0);

        let back: Jdom = serde_json::from_value(value).unwrap();
        assert_eq!(back, jdom);
    }

    #[test]
    fn test_url_omitted_when_absent() {
        let jdom = Jdom::new("x".to_string(), vec![], vec![]).unwrap();
        let json = serde_json::to_string(&jdom).unwrap();
        assert!(!json.contains("url"));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"rawContent":"<p>x</p>","marks":[],"readingOrder":[{"start":3,"end":99,"index":0}]}"#;
        assert!(serde_json::from_str::<Jdom>(json).is_err());
    }

    #[test]
    fn test_mark_crossing() {
        let outer = Mark::new(MarkType::Paragraph, 0, 10);
        let inner = Mark::new(MarkType::Bold, 2, 5);
        let crossing = Mark::new(MarkType::Italic, 4, 12);
        assert!(!outer.crosses(&inner));
        assert!(inner.crosses(&crossing));
        assert!(outer.crosses(&crossing));
        assert!(!inner.crosses(&Mark::new(MarkType::Italic, 5, 8)));
    }

    #[test]
    fn test_user_mark_is_inclusive() {
        let mark = UserMark::new(3, 9, "highlight");
        assert!(mark.covers(3));
        assert!(mark.covers(9));
        assert!(!mark.covers(10));
    }
}
