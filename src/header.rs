//! Tokenizer for the header block of a multipart part.
//!
//! A part's header block looks like:
//!
//! ```text
//! Content-Disposition: form-data; name="photo"; filename="pic.png"
//! Content-Type: image/png
//! Content-Transfer-Encoding: binary
//! ```
//!
//! Two lookups are needed: quoted `key="value"` attributes anywhere in the
//! block, and the first token of a `Key: value` line.

use std::borrow::Cow;

/// A borrowed view of a part's header block.
#[derive(Debug, Clone, Copy)]
pub struct HeaderBlock<'a> {
    text: &'a str,
}

impl<'a> HeaderBlock<'a> {
    /// Wraps the header text of a part.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Returns the raw header text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Returns the value of the first `key="value"` attribute.
    ///
    /// The key must start a word outside any quoted string, so `name` matches
    /// neither inside `filename` nor inside another attribute's value. Keys
    /// are case-sensitive, as the form-data attributes are always emitted in
    /// lowercase. The value may be empty.
    ///
    /// Within the value, `\"` and `\\` stand for `"` and `\`; any other
    /// backslash is kept, so raw Windows paths such as `C:\tmp\a.pdf` come
    /// through unchanged. An unterminated value runs to the end of its line.
    pub fn attribute(&self, key: &str) -> Option<Cow<'a, str>> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            if bytes[pos] == b'"' {
                pos = skip_quoted(bytes, pos + 1);
                continue;
            }
            if bytes[pos..].starts_with(key.as_bytes()) && starts_word(text, pos) {
                let open = pos + key.len();
                if bytes[open..].starts_with(b"=\"") {
                    let start = open + 2;
                    let end = quoted_end(bytes, start);
                    return Some(unescape(&text[start..end]));
                }
            }
            pos += 1;
        }
        None
    }

    /// Reports whether a `key="..."` attribute is present.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Returns the first whitespace-delimited token of the `key: value` line.
    ///
    /// Header names are matched case-insensitively.
    pub fn line_value(&self, key: &str) -> Option<&'a str> {
        self.text.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if !name.trim().eq_ignore_ascii_case(key) {
                return None;
            }
            value.split_whitespace().next()
        })
    }
}

/// Returns the index of the quote closing the string that starts at `start`,
/// or of the line end if the string is unterminated.
fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\r' | b'\n' => return i,
            b'\\' if matches!(bytes.get(i + 1), Some(b'"' | b'\\')) => i += 2,
            _ => i += 1,
        }
    }
    i
}

/// Returns the index just past the quoted string that starts at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let end = quoted_end(bytes, start);
    if bytes.get(end) == Some(&b'"') {
        end + 1
    } else {
        end
    }
}

fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains("\\\"") && !raw.contains("\\\\") {
        return Cow::Borrowed(raw);
    }

    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('\\', Some(&next @ ('"' | '\\'))) => {
                value.push(next);
                chars.next();
            }
            _ => value.push(ch),
        }
    }
    Cow::Owned(value)
}

/// Reports whether the byte at `pos` begins an identifier.
fn starts_word(text: &str, pos: usize) -> bool {
    match text.as_bytes()[..pos].last() {
        None => true,
        Some(&b) => !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
    }
}
