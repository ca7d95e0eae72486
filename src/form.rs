//! Decoded form data.

use crate::error::{Error, Result};
use crate::quotedprintable;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::hash_map::{self, HashMap};

/// The transfer encoding assumed when a part does not declare one.
pub const DEFAULT_ENCODING: &str = "7bit";

/// A single decoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A plain field; the part body interpreted as text.
    Text(String),
    /// A file upload.
    File(FileField),
}

impl Field {
    /// Returns the text value, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(value) => Some(value),
            Field::File(_) => None,
        }
    }

    /// Returns the file, if this is a file field.
    pub fn as_file(&self) -> Option<&FileField> {
        match self {
            Field::File(file) => Some(file),
            Field::Text(_) => None,
        }
    }

    /// Reports whether this field is a file upload.
    pub fn is_file(&self) -> bool {
        matches!(self, Field::File(_))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<FileField> for Field {
    fn from(file: FileField) -> Self {
        Field::File(file)
    }
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// The raw part body, exactly as sent. Owned independently of the request buffer.
    pub body: Bytes,
    /// The client-supplied file name; empty if none was given.
    pub file_name: String,
    /// The declared `Content-Transfer-Encoding`, `7bit` by default.
    pub encoding: String,
    /// The MIME type sniffed from the body's leading bytes.
    pub mime_type: String,
}

impl FileField {
    /// Returns the body with its transfer encoding removed.
    ///
    /// `7bit`, `8bit` and `binary` bodies are returned as-is; `base64` bodies
    /// are decoded, ignoring line breaks and other ASCII whitespace;
    /// `quoted-printable` bodies are decoded by
    /// [`quotedprintable::decode`](crate::quotedprintable::decode).
    ///
    /// # Errors
    ///
    /// [`Error::Encoding`] if the body is not valid in its encoding, or if the
    /// encoding is none of the above (for example `x-uuencode`).
    pub fn decoded_body(&self) -> Result<Cow<'_, [u8]>> {
        let encoding = self.encoding.as_str();
        if ["7bit", "8bit", "binary"]
            .iter()
            .any(|e| e.eq_ignore_ascii_case(encoding))
        {
            return Ok(Cow::Borrowed(&self.body[..]));
        }

        if encoding.eq_ignore_ascii_case("base64") {
            let compact: Vec<u8> = self
                .body
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            return STANDARD
                .decode(compact)
                .map(Cow::Owned)
                .map_err(|e| Error::Encoding(format!("invalid base64 body: {}", e)));
        }

        if encoding.eq_ignore_ascii_case("quoted-printable") {
            return quotedprintable::decode(&self.body).map(Cow::Owned);
        }

        Err(Error::Encoding(format!(
            "unsupported transfer encoding {:?}",
            encoding
        )))
    }
}

/// A decoded `multipart/form-data` body, keyed by field name.
///
/// Each name maps to a single field; inserting a name again replaces the
/// earlier field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: HashMap<String, Field>,
}

impl Form {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, field: impl Into<Field>) -> Option<Field> {
        self.fields.insert(name.into(), field.into())
    }

    /// Returns the field with the given name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns the text value of the named field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Field::as_text)
    }

    /// Returns the named file upload.
    pub fn file(&self, name: &str) -> Option<&FileField> {
        self.get(name).and_then(Field::as_file)
    }

    /// Reports whether a field with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Field> {
        self.fields.iter()
    }

    /// Consumes the form, returning the underlying map.
    pub fn into_inner(self) -> HashMap<String, Field> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a Form {
    type Item = (&'a String, &'a Field);
    type IntoIter = hash_map::Iter<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for Form {
    type Item = (String, Field);
    type IntoIter = hash_map::IntoIter<String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K: Into<String>, V: Into<Field>> FromIterator<(K, V)> for Form {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Form::new();
        for (name, field) in iter {
            form.insert(name, field);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(body: &'static [u8], encoding: &str) -> FileField {
        FileField {
            body: Bytes::from_static(body),
            file_name: "f.bin".to_string(),
            encoding: encoding.to_string(),
            mime_type: "application/zip".to_string(),
        }
    }

    #[test]
    fn test_last_insert_wins() {
        let mut form = Form::new();
        assert!(form.insert("a", "first").is_none());
        let replaced = form.insert("a", "second");
        assert_eq!(replaced, Some(Field::Text("first".to_string())));
        assert_eq!(form.text("a"), Some("second"));
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_accessors() {
        let form: Form = vec![
            ("note", Field::from("hello")),
            ("doc", Field::from(file(b"PK\x03\x04", DEFAULT_ENCODING))),
        ]
        .into_iter()
        .collect();

        assert_eq!(form.text("note"), Some("hello"));
        assert!(form.file("note").is_none());
        assert_eq!(form.file("doc").unwrap().file_name, "f.bin");
        assert!(form.text("doc").is_none());
        assert!(form.get("doc").unwrap().is_file());
        assert!(form.contains("note"));
        assert!(!form.contains("missing"));
        assert_eq!(form.iter().count(), 2);
    }

    #[test]
    fn test_decoded_body_passthrough() {
        for encoding in ["7bit", "8bit", "binary", "BINARY"] {
            let f = file(b"PK\x03\x04raw", encoding);
            assert!(matches!(f.decoded_body().unwrap(), Cow::Borrowed(b) if b == b"PK\x03\x04raw"));
        }
    }

    #[test]
    fn test_decoded_body_base64() {
        let f = file(b"UEsDBA==\r\n", "base64");
        assert_eq!(f.decoded_body().unwrap().as_ref(), b"PK\x03\x04");

        let f = file(b"not base64!", "base64");
        assert!(matches!(f.decoded_body(), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_decoded_body_quoted_printable() {
        let f = file(b"PK=03=04=\r\nrest\r\n", "Quoted-Printable");
        assert_eq!(f.decoded_body().unwrap().as_ref(), b"PK\x03\x04rest\r\n");

        let f = file(b"PK\x00", "quoted-printable");
        assert!(matches!(f.decoded_body(), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_decoded_body_unsupported() {
        let f = file(b"begin 644 f.bin", "x-uuencode");
        let err = f.decoded_body().unwrap_err();
        assert!(matches!(err, Error::Encoding(ref msg) if msg.contains("x-uuencode")));
    }
}
