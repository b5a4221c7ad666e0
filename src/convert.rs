//! HTML to JDOM conversion.
//!
//! # Example
//!
//! ```
//! use standoff::{MarkType, html_to_jdom};
//!
//! let jdom = html_to_jdom("<h1>Fox</h1><nav>Menu</nav><p>The fox <b>jumped</b>.</p>").unwrap();
//!
//! assert_eq!(jdom.to_text(), "FoxThe fox jumped.");
//! assert_eq!(jdom.marks()[0].mark_type, MarkType::Heading1);
//! ```

use crate::classify::NonReadableTags;
use crate::error::Result;
use crate::jdom::Jdom;
use crate::source::{HtmlSourceParser, SourceParser};
use crate::walker;

/// Configuration for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Subtrees excluded from reading order and marks.
    pub non_readable: NonReadableTags,
}

/// Converts HTML into a [`Jdom`] using a pluggable source parser.
#[derive(Debug, Clone, Default)]
pub struct Converter<P = HtmlSourceParser> {
    options: ConvertOptions,
    parser: P,
}

impl Converter {
    /// Create a Converter with the baseline non-readable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Converter with the specified configuration.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            parser: HtmlSourceParser,
        }
    }
}

impl<P: SourceParser> Converter<P> {
    /// Swap in a different parser collaborator.
    pub fn with_parser<Q: SourceParser>(self, parser: Q) -> Converter<Q> {
        Converter {
            options: self.options,
            parser,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert an HTML document.
    ///
    /// Fails with [`Error::Parse`](crate::Error::Parse) if the parser does, and
    /// with an offset error if the parser hands back spans that do not fit the
    /// input.
    pub fn convert(&self, html: &str) -> Result<Jdom> {
        let tree = self.parser.parse(html)?;
        let out = walker::walk(&tree.nodes, &self.options.non_readable);

        tracing::debug!(
            bytes = html.len(),
            marks = out.marks.len(),
            reading_order = out.reading_order.len(),
            "converted html"
        );

        Jdom::new(html.to_owned(), out.marks, out.reading_order)
    }

    /// Convert an HTML document fetched from `url`.
    pub fn convert_with_url(&self, html: &str, url: &str) -> Result<Jdom> {
        Ok(self.convert(html)?.with_url(url))
    }
}

/// Convert HTML with the default options.
pub fn html_to_jdom(html: &str) -> Result<Jdom> {
    Converter::new().convert(html)
}

/// Convert HTML with the default options and record its source URL.
pub fn html_to_jdom_with_url(html: &str, url: &str) -> Result<Jdom> {
    Converter::new().convert_with_url(html, url)
}

/// The readable text of a JDOM, in reading order.
pub fn jdom_to_text(jdom: &Jdom) -> String {
    jdom.to_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MarkType;
    use crate::error::Error;
    use crate::jdom::{Mark, ReadingOrderEntry};
    use crate::source::{ElementNode, SourceNode, SourceTree, Span};

    struct FailingParser;

    impl SourceParser for FailingParser {
        fn parse(&self, _html: &str) -> Result<SourceTree> {
            Err(Error::Parse("unsupported input".into()))
        }
    }

    /// Returns a fixed tree regardless of input.
    struct FixedParser(SourceTree);

    impl SourceParser for FixedParser {
        fn parse(&self, _html: &str) -> Result<SourceTree> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_fox_document() {
        let html = "<h1>Fox</h1><nav><h1>Content</h1></nav><p>The fox <b>jumped</b>.</p>";
        let jdom = html_to_jdom(html).unwrap();

        assert_eq!(jdom.raw_content(), html);
        assert!(jdom.marks().contains(&Mark::new(MarkType::Heading1, 4, 7)));
        assert!(jdom.marks().contains(&Mark::new(MarkType::Paragraph, 42, 64)));
        assert!(jdom.marks().contains(&Mark::new(MarkType::Bold, 53, 59)));
        assert!(!jdom.marks().contains(&Mark::new(MarkType::Heading1, 21, 28)));
        assert!(jdom.reading_order().contains(&ReadingOrderEntry {
            start: 4,
            end: 7,
            index: 0
        }));
        assert_eq!(jdom_to_text(&jdom), "FoxThe fox jumped.");
    }

    #[test]
    fn test_full_document_reading_order() {
        let html = "<!DOCTYPE html><html><head></head><body><p>The fox <b>jumped</b>.</p></body></html>";
        let jdom = html_to_jdom(html).unwrap();
        assert_eq!(jdom.reading_order().len(), 3);
    }

    #[test]
    fn test_void_elements_between_paragraphs() {
        let html = "<p>The <b>fox</b></p><meta/><br/><p>jumped <i>over</i></p>";
        let jdom = html_to_jdom(html).unwrap();
        assert_eq!(jdom.reading_order().len(), 4);
        assert_eq!(jdom.to_text(), "The foxjumped over");
    }

    #[test]
    fn test_head_content_excluded() {
        let html = "<html><head><title>Title</title><style>p{}</style></head><body><p>x</p></body></html>";
        let jdom = html_to_jdom(html).unwrap();
        assert_eq!(jdom.to_text(), "x");
    }

    #[test]
    fn test_metadata_without_head_excluded() {
        let jdom = html_to_jdom("<!DOCTYPE html><title>Page Title</title><p>Hi</p>").unwrap();
        assert_eq!(jdom.to_text(), "Hi");
        assert_eq!(jdom.marks(), &[Mark::new(MarkType::Paragraph, 43, 45)]);
    }

    #[test]
    fn test_whitespace_before_head_not_read() {
        let html = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<title>T</title>\n</head><body><p>x</p></body></html>";
        let jdom = html_to_jdom(html).unwrap();
        assert_eq!(jdom.reading_order().len(), 1);
        assert_eq!(jdom.to_text(), "x");
    }

    #[test]
    fn test_options_extend_exclusions() {
        let options = ConvertOptions {
            non_readable: NonReadableTags::default().with("aside"),
        };
        let jdom = Converter::with_options(options)
            .convert("<aside>ad</aside><p>text</p>")
            .unwrap();
        assert_eq!(jdom.to_text(), "text");
    }

    #[test]
    fn test_url_recorded() {
        let jdom = html_to_jdom_with_url("<p>x</p>", "https://example.com/a").unwrap();
        assert_eq!(jdom.url(), Some("https://example.com/a"));
    }

    #[test]
    fn test_parser_failure_surfaces() {
        let err = Converter::new()
            .with_parser(FailingParser)
            .convert("<p>")
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_out_of_range_parser_offsets_fail_conversion() {
        let tree = SourceTree {
            nodes: vec![SourceNode::Element(ElementNode {
                name: "p".into(),
                start_tag: Span::new(0, 3),
                end_tag: Some(Span::new(50, 54)),
                children: vec![SourceNode::Text(Span::new(3, 50))],
            })],
        };
        let err = Converter::new()
            .with_parser(FixedParser(tree))
            .convert("<p>short</p>")
            .unwrap_err();
        assert!(matches!(err, Error::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn test_empty_input() {
        let jdom = html_to_jdom("").unwrap();
        assert!(jdom.marks().is_empty());
        assert!(jdom.reading_order().is_empty());
        assert_eq!(jdom.to_text(), "");
    }
}
