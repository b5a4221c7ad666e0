//! Property tests over generated HTML.

use proptest::prelude::*;

use standoff::source::{SourceNode, SourceParser};
use standoff::{
    HtmlSourceParser, Mark, MarkType, NonReadableTags, ReconstructOptions, Reconstructor,
    UserMark, html_to_jdom,
};

const TAGS: &[&str] = &[
    "p", "b", "i", "em", "strong", "h1", "h2", "h3", "div", "span", "nav", "footer", "script",
    "style", "blockquote", "li",
];

/// Text without markup characters.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,é]{0,12}"
}

/// HTML fragments, sometimes with voids and comments mixed in.
fn fragment() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        4 => text(),
        1 => Just("<br>".to_string()),
        1 => Just("<img src=\"x.png\"/>".to_string()),
        1 => Just("<!-- note -->".to_string()),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            prop::sample::select(TAGS),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, children)| format!("<{tag}>{}</{tag}>", children.concat()))
    })
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..6).prop_map(|parts| parts.concat())
}

/// Text runs and would-be marks beneath non-readable elements of the parsed tree.
#[derive(Default)]
struct Hidden {
    texts: Vec<(usize, usize)>,
    marks: Vec<Mark>,
}

fn collect_hidden(nodes: &[SourceNode], hidden_parent: bool, out: &mut Hidden) {
    let tags = NonReadableTags::default();
    for node in nodes {
        match node {
            SourceNode::Element(el) => {
                if hidden_parent
                    && let (Some(mark_type), Some(content)) =
                        (MarkType::from_tag(&el.name), el.content_span())
                {
                    out.marks.push(Mark::new(mark_type, content.start, content.end));
                }
                let hidden = hidden_parent || tags.contains(&el.name);
                collect_hidden(&el.children, hidden, out);
            }
            SourceNode::Text(span) if hidden_parent => out.texts.push((span.start, span.end)),
            _ => {}
        }
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_raw_content_is_identical(html in document()) {
        let jdom = html_to_jdom(&html).unwrap();
        prop_assert_eq!(jdom.raw_content(), html.as_str());
    }

    #[test]
    fn prop_reading_order_indices_contiguous(html in document()) {
        let jdom = html_to_jdom(&html).unwrap();
        for (i, entry) in jdom.reading_order().iter().enumerate() {
            prop_assert_eq!(entry.index, i);
        }
        prop_assert!(jdom.is_reading_order_ascending());
    }

    #[test]
    fn prop_nothing_from_excluded_subtrees(html in document()) {
        let jdom = html_to_jdom(&html).unwrap();
        let tree = HtmlSourceParser::new().parse(&html).unwrap();
        let mut hidden = Hidden::default();
        collect_hidden(&tree.nodes, false, &mut hidden);

        for entry in jdom.reading_order() {
            prop_assert!(
                !hidden.texts.contains(&(entry.start, entry.end)),
                "hidden text {:?} in reading order of {}", jdom.entry_text(entry), html
            );
        }
        for mark in &hidden.marks {
            prop_assert!(!jdom.marks().contains(mark), "hidden mark {:?} in {}", mark, html);
        }
    }

    #[test]
    fn prop_scan_and_indexed_agree(
        html in document(),
        marks in prop::collection::vec((0usize..200, 0usize..40, "[ab]"), 0..4),
    ) {
        let jdom = html_to_jdom(&html).unwrap();
        let user_marks: Vec<UserMark> = marks
            .into_iter()
            .map(|(start, len, label)| UserMark::new(start, start + len, label))
            .collect();
        let render = |strategy| {
            Reconstructor::with_options(ReconstructOptions {
                strategy,
                ..ReconstructOptions::default()
            })
            .reconstruct(&jdom, &user_marks)
        };
        prop_assert_eq!(
            render(standoff::Strategy::Scan),
            render(standoff::Strategy::Indexed)
        );
    }

    #[test]
    fn prop_output_text_is_reading_order(html in document()) {
        let jdom = html_to_jdom(&html).unwrap();
        let out = Reconstructor::with_options(ReconstructOptions {
            diagnostic_attributes: false,
            ..ReconstructOptions::default()
        })
        .reconstruct(&jdom, &[]);
        prop_assert_eq!(strip_tags(&out), jdom.to_text());
    }
}
