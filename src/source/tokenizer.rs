//! Byte-level HTML tokenizer that reports the source span of every token.
//!
//! The tokenizer is deliberately forgiving: anything that does not look like
//! markup is text, unterminated comments run to the end of input, and an
//! unterminated tag degrades to text. Every input byte belongs to exactly one
//! token, so spans tile the source without gaps.

use memchr::memchr;
use memchr::memmem;

use super::{Span, is_raw_text};

/// What a token is, independent of where it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    StartTag { name: String, self_closing: bool },
    EndTag { name: String },
    Text,
    Comment,
    Doctype,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Iterator over the tokens of an HTML string.
pub struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Set after a raw-text start tag; content runs to `</name`.
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            bytes: src.as_bytes(),
            pos: 0,
            raw_text: None,
        }
    }

    fn token(&mut self, kind: TokenKind, end: usize) -> Token {
        let span = Span::new(self.pos, end);
        self.pos = end;
        Token { kind, span }
    }

    fn raw_text_token(&mut self, name: &str) -> Option<Token> {
        let end = if name == "plaintext" {
            self.bytes.len()
        } else {
            find_end_tag(self.bytes, self.pos, name).unwrap_or(self.bytes.len())
        };
        (end > self.pos).then(|| self.token(TokenKind::Text, end))
    }

    fn markup_token(&mut self) -> Option<Token> {
        let bytes = self.bytes;
        let start = self.pos;

        if bytes[start..].starts_with(b"<!--") {
            let end = memmem::find(&bytes[start + 4..], b"-->")
                .map_or(bytes.len(), |i| start + 4 + i + 3);
            return Some(self.token(TokenKind::Comment, end));
        }

        match bytes.get(start + 1) {
            Some(b'!') => {
                let end = memchr(b'>', &bytes[start..]).map_or(bytes.len(), |i| start + i + 1);
                Some(self.token(TokenKind::Doctype, end))
            }
            Some(b'?') => {
                let end = memchr(b'>', &bytes[start..]).map_or(bytes.len(), |i| start + i + 1);
                Some(self.token(TokenKind::Comment, end))
            }
            Some(b'/') => {
                if bytes.get(start + 2) == Some(&b'>') {
                    // `</>` is dropped by browsers; keep it as an inert comment
                    return Some(self.token(TokenKind::Comment, start + 3));
                }
                let name_end = scan_name(bytes, start + 2);
                let name = lowercase(&bytes[start + 2..name_end]);
                let end = memchr(b'>', &bytes[name_end..]).map(|i| name_end + i + 1)?;
                Some(self.token(TokenKind::EndTag { name }, end))
            }
            Some(_) => {
                let name_end = scan_name(bytes, start + 1);
                let name = lowercase(&bytes[start + 1..name_end]);
                let close = scan_tag_close(bytes, name_end)?;
                let self_closing = close > name_end && bytes[close - 1] == b'/';
                if is_raw_text(&name) {
                    self.raw_text = Some(name.clone());
                }
                Some(self.token(TokenKind::StartTag { name, self_closing }, close + 1))
            }
            None => None,
        }
    }

    fn text_token(&mut self) -> Token {
        let mut cursor = self.pos;
        loop {
            match memchr(b'<', &self.bytes[cursor..]) {
                Some(i) => {
                    let at = cursor + i;
                    if at > self.pos && starts_markup(self.bytes, at) {
                        return self.token(TokenKind::Text, at);
                    }
                    cursor = at + 1;
                }
                None => return self.token(TokenKind::Text, self.bytes.len()),
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.bytes.len() {
            return None;
        }

        if let Some(name) = self.raw_text.take()
            && let Some(token) = self.raw_text_token(&name)
        {
            return Some(token);
        }

        if starts_markup(self.bytes, self.pos) {
            if let Some(token) = self.markup_token() {
                return Some(token);
            }
            // Unterminated tag: the rest of the input is text.
            return Some(self.token(TokenKind::Text, self.bytes.len()));
        }

        Some(self.text_token())
    }
}

/// Does a tag, comment, or declaration begin at `at`?
fn starts_markup(bytes: &[u8], at: usize) -> bool {
    if bytes.get(at) != Some(&b'<') {
        return false;
    }
    match bytes.get(at + 1) {
        Some(b'!' | b'?') => true,
        Some(b'/') => matches!(bytes.get(at + 2), Some(b) if b.is_ascii_alphabetic() || *b == b'>'),
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    }
}

fn scan_name(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
        .map_or(bytes.len(), |i| from + i)
}

/// Index of the `>` closing a start tag, skipping quoted attribute values.
fn scan_tag_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    let mut after_eq = false;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            quote @ (b'"' | b'\'') if after_eq => {
                i = memchr(quote, &bytes[i + 1..]).map(|j| i + 1 + j)?;
                after_eq = false;
            }
            b'=' => after_eq = true,
            b if b.is_ascii_whitespace() => {}
            _ => after_eq = false,
        }
        i += 1;
    }
    None
}

/// Position of `</name` (ASCII case-insensitive) followed by a tag terminator.
fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let finder = memmem::Finder::new(b"</");
    let name = name.as_bytes();
    finder.find_iter(&bytes[from..]).map(|i| from + i).find(|&at| {
        let name_start = at + 2;
        let name_end = name_start + name.len();
        name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && bytes
                .get(name_end)
                .is_none_or(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
    })
}

fn lowercase(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(html: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::new(html)
            .map(|t| (t.kind, &html[t.span.start..t.span.end]))
            .collect()
    }

    fn start(name: &str) -> TokenKind {
        TokenKind::StartTag {
            name: name.to_string(),
            self_closing: false,
        }
    }

    fn end(name: &str) -> TokenKind {
        TokenKind::EndTag {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds("<p>Hi</p>"),
            vec![
                (start("p"), "<p>"),
                (TokenKind::Text, "Hi"),
                (end("p"), "</p>"),
            ]
        );
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        assert_eq!(kinds("<DIV>")[0].0, start("div"));
    }

    #[test]
    fn test_self_closing() {
        let tokens = kinds("<br/><meta charset=\"utf-8\" />");
        assert_eq!(
            tokens[0].0,
            TokenKind::StartTag {
                name: "br".into(),
                self_closing: true
            }
        );
        assert_eq!(tokens[1].1, "<meta charset=\"utf-8\" />");
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let tokens = kinds(r#"<a title="a > b">x</a>"#);
        assert_eq!(tokens[0].1, r#"<a title="a > b">"#);
        assert_eq!(tokens[1], (TokenKind::Text, "x"));
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = kinds("<!DOCTYPE html><!-- c --><p>");
        assert_eq!(tokens[0], (TokenKind::Doctype, "<!DOCTYPE html>"));
        assert_eq!(tokens[1], (TokenKind::Comment, "<!-- c -->"));
    }

    #[test]
    fn test_literal_lt_is_text() {
        let tokens = kinds("<p>a < b</p>");
        assert_eq!(tokens[1], (TokenKind::Text, "a < b"));
    }

    #[test]
    fn test_script_is_raw_text() {
        let tokens = kinds("<script>if (a<b) { x = '</p>'; }</script>");
        assert_eq!(tokens[1], (TokenKind::Text, "if (a<b) { x = '</p>'; }"));
        assert_eq!(tokens[2], (end("script"), "</script>"));
    }

    #[test]
    fn test_raw_text_end_tag_is_case_insensitive() {
        let tokens = kinds("<style>p{}</STYLE>");
        assert_eq!(tokens[1], (TokenKind::Text, "p{}"));
        assert_eq!(tokens[2].0, end("style"));
    }

    #[test]
    fn test_empty_raw_text() {
        let tokens = kinds("<script></script>");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_unterminated_comment_runs_to_eof() {
        let tokens = kinds("a<!-- never closed");
        assert_eq!(tokens[1], (TokenKind::Comment, "<!-- never closed"));
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        let tokens = kinds("x<p class=");
        assert_eq!(tokens, vec![(TokenKind::Text, "x"), (TokenKind::Text, "<p class=")]);
    }

    #[test]
    fn test_spans_tile_input() {
        let html = "<!DOCTYPE html><html><head><title>T</title></head><body><p>a<b>b</b></p></body></html>";
        let mut expected = 0;
        for token in Tokenizer::new(html) {
            assert_eq!(token.span.start, expected);
            expected = token.span.end;
        }
        assert_eq!(expected, html.len());
    }

    #[test]
    fn test_multibyte_text() {
        let tokens = kinds("<p>héllo — ok</p>");
        assert_eq!(tokens[1], (TokenKind::Text, "héllo — ok"));
    }
}
