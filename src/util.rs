//! Input decoding.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// How many leading bytes are searched for a `<meta>` charset declaration.
const META_SNIFF_LIMIT: usize = 1024;

/// Decode HTML bytes to a string, handling various encodings.
///
/// This function:
/// 1. Honors a byte order mark (UTF-8, UTF-16LE, UTF-16BE)
/// 2. Uses UTF-8 if the bytes are valid UTF-8
/// 3. Tries the charset declared by a `<meta>` tag near the start
/// 4. Falls back to Windows-1252
///
/// The returned string becomes a JDOM's `rawContent`, so every offset in the
/// JDOM refers to the decoded text, not the input bytes.
///
/// # Examples
///
/// ```
/// use standoff::util::decode_html;
///
/// assert_eq!(decode_html(b"<p>caf\xc3\xa9</p>"), "<p>café</p>");
/// assert_eq!(decode_html(b"<p>caf\xe9</p>"), "<p>café</p>");
/// ```
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (result, _) = encoding.decode_with_bom_removal(bytes);
        return result;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    if let Some(encoding) = sniff_meta_charset(bytes) {
        tracing::debug!(encoding = encoding.name(), "decoding with declared charset");
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    tracing::debug!("input is not UTF-8; falling back to windows-1252");
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find `charset=` inside the first `<meta` tags of the document head.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let mut rest = head;

    while let Some(at) = find_ascii_ci(rest, b"<meta") {
        let tag = &rest[at..];
        let tag_end = memchr::memchr(b'>', tag).unwrap_or(tag.len());
        let tag = &tag[..tag_end];

        if let Some(pos) = find_ascii_ci(tag, b"charset") {
            let value = tag[pos + b"charset".len()..]
                .iter()
                .skip_while(|b| b.is_ascii_whitespace())
                .copied()
                .collect::<Vec<u8>>();
            if let Some(label) = value.strip_prefix(b"=") {
                let label: Vec<u8> = label
                    .iter()
                    .copied()
                    .skip_while(|b| b.is_ascii_whitespace() || *b == b'"' || *b == b'\'')
                    .take_while(|b| !b.is_ascii_whitespace() && !is_label_end(*b))
                    .collect();
                if let Some(encoding) = Encoding::for_label(&label) {
                    // A declared UTF-8 (or UTF-16) that failed to validate is not trustworthy
                    return (encoding.output_encoding() != encoding_rs::UTF_8).then_some(encoding);
                }
            }
        }

        rest = &rest[at + tag_end.max(1)..];
    }
    None
}

fn is_label_end(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b';' | b'/')
}

fn find_ascii_ci(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
