//! `multipart/form-data` writer.
//!
//! Produces bodies in the layout [`decode`](crate::decode) consumes: each part
//! opens with `--boundary`, then its headers, a blank line and the content;
//! the body ends with `--boundary--`.

use crate::error::{Error, Result};
use crate::form::{Field, FileField, Form, DEFAULT_ENCODING};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Longest boundary allowed by RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// An async `multipart/form-data` writer.
pub struct Writer<W> {
    writer: W,
    boundary: String,
    has_parts: bool,
}

impl<W: AsyncWrite + Unpin> Writer<W> {
    /// Creates a new writer with a random boundary.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tokio_formdata::multipart::Writer;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut output = Vec::new();
    /// let mut writer = Writer::new(&mut output)?;
    /// writer.write_field("note", "hello").await?;
    /// writer.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(writer: W) -> Result<Self> {
        Ok(Self {
            writer,
            boundary: generate_boundary()?,
            has_parts: false,
        })
    }

    /// Returns the writer's boundary string.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Sets a custom boundary.
    ///
    /// This must be called before writing any parts. The boundary must be
    /// 1-70 characters from the RFC 2046 `bchars` set and must not end in a space.
    pub fn set_boundary(&mut self, boundary: impl Into<String>) -> Result<()> {
        if self.has_parts {
            return Err(Error::Multipart(
                "cannot set boundary after writing parts".to_string(),
            ));
        }

        let boundary = boundary.into();
        if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
            return Err(Error::Multipart("invalid boundary length".to_string()));
        }

        let last = boundary.len() - 1;
        if let Some(ch) = boundary.chars().enumerate().find_map(|(i, ch)| {
            let valid = ch.is_ascii_alphanumeric()
                || matches!(ch, '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?')
                || (ch == ' ' && i != last);
            (!valid).then_some(ch)
        }) {
            return Err(Error::Multipart(format!(
                "invalid boundary character: {:?}",
                ch
            )));
        }

        self.boundary = boundary;
        Ok(())
    }

    /// Returns the `Content-Type` header value announcing this writer's boundary.
    pub fn content_type(&self) -> String {
        if self.boundary.contains(|c| matches!(c, '(' | ')' | ',' | ':' | '/' | '?' | '=' | ' ' | '\'' | '+')) {
            format!("multipart/form-data; boundary=\"{}\"", self.boundary)
        } else {
            format!("multipart/form-data; boundary={}", self.boundary)
        }
    }

    /// Writes a text field.
    ///
    /// Fails if `name` contains a line break.
    pub async fn write_field(&mut self, name: &str, value: &str) -> Result<()> {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name)?);
        self.write_part(&[("Content-Disposition", disposition)], value.as_bytes())
            .await
    }

    /// Writes a file field.
    ///
    /// The file's MIME type becomes the part's `Content-Type`; a
    /// `Content-Transfer-Encoding` header is added unless the encoding is `7bit`.
    /// Fails if `name` or the file name contains a line break.
    pub async fn write_file(&mut self, name: &str, file: &FileField) -> Result<()> {
        let mut headers = vec![
            (
                "Content-Disposition",
                format!(
                    "form-data; name=\"{}\"; filename=\"{}\"",
                    escape_quotes(name)?,
                    escape_quotes(&file.file_name)?
                ),
            ),
            ("Content-Type", file.mime_type.clone()),
        ];
        if !file.encoding.eq_ignore_ascii_case(DEFAULT_ENCODING) {
            headers.push(("Content-Transfer-Encoding", file.encoding.clone()));
        }
        self.write_part(&headers, &file.body).await
    }

    /// Writes every field of `form`, in name order.
    pub async fn write_form(&mut self, form: &Form) -> Result<()> {
        let mut fields: Vec<_> = form.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        for (name, field) in fields {
            match field {
                Field::Text(value) => self.write_field(name, value).await?,
                Field::File(file) => self.write_file(name, file).await?,
            }
        }
        Ok(())
    }

    async fn write_part(&mut self, headers: &[(&str, String)], content: &[u8]) -> Result<()> {
        if self.has_parts {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer
            .write_all(format!("--{}\r\n", self.boundary).as_bytes())
            .await?;

        for (key, value) in headers {
            self.writer
                .write_all(format!("{}: {}\r\n", key, value).as_bytes())
                .await?;
        }

        self.writer.write_all(b"\r\n").await?;
        self.writer.write_all(content).await?;
        self.has_parts = true;
        Ok(())
    }

    /// Closes the body by writing the final boundary, and returns the inner writer.
    pub async fn close(mut self) -> Result<W> {
        if self.has_parts {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer
            .write_all(format!("--{}--\r\n", self.boundary).as_bytes())
            .await?;
        self.writer.flush().await?;
        Ok(self.writer)
    }
}

/// Generates a random 60-character hex boundary.
fn generate_boundary() -> Result<String> {
    let mut buf = [0u8; 30];
    getrandom::getrandom(&mut buf)
        .map_err(|e| Error::Multipart(format!("failed to generate boundary: {}", e)))?;
    Ok(hex::encode(buf))
}

/// Escapes quotes and backslashes for a quoted header parameter.
///
/// Line breaks cannot be represented inside a header line and are rejected.
fn escape_quotes(s: &str) -> Result<String> {
    if s.contains(['\r', '\n']) {
        return Err(Error::Multipart(format!(
            "line break in header parameter {:?}",
            s
        )));
    }
    Ok(s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_write_fields() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.set_boundary("b").unwrap();
        writer.write_field("field1", "value1").await.unwrap();
        writer.write_field("field2", "value2").await.unwrap();
        let output = writer.close().await.unwrap();

        let expected = "--b\r\n\
Content-Disposition: form-data; name=\"field1\"\r\n\
\r\n\
value1\r\n\
--b\r\n\
Content-Disposition: form-data; name=\"field2\"\r\n\
\r\n\
value2\r\n\
--b--\r\n";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_write_file() {
        let file = FileField {
            body: Bytes::from_static(b"%PDF-1.7"),
            file_name: "report.pdf".to_string(),
            encoding: "binary".to_string(),
            mime_type: "application/pdf".to_string(),
        };

        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.write_file("upload", &file).await.unwrap();
        let result = String::from_utf8(writer.close().await.unwrap()).unwrap();

        assert!(result.contains("name=\"upload\"; filename=\"report.pdf\""));
        assert!(result.contains("Content-Type: application/pdf\r\n"));
        assert!(result.contains("Content-Transfer-Encoding: binary\r\n"));
        assert!(result.contains("%PDF-1.7"));
    }

    #[tokio::test]
    async fn test_seven_bit_omits_encoding_header() {
        let file = FileField {
            body: Bytes::from_static(b"GIF89a"),
            file_name: "a.gif".to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            mime_type: "image/gif".to_string(),
        };

        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.write_file("img", &file).await.unwrap();
        let result = String::from_utf8(writer.close().await.unwrap()).unwrap();
        assert!(!result.contains("Content-Transfer-Encoding"));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.set_boundary("end").unwrap();
        let output = writer.close().await.unwrap();
        assert_eq!(output, b"--end--\r\n");
    }

    #[tokio::test]
    async fn test_boundary_locked_after_write() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.write_field("a", "b").await.unwrap();
        assert!(writer.set_boundary("late").is_err());
    }

    #[test]
    fn test_boundary_validation() {
        let mut writer = Writer::new(Vec::new()).unwrap();

        assert!(writer.set_boundary("simple-boundary").is_ok());
        assert!(writer.set_boundary("a".repeat(71)).is_err());
        assert!(writer.set_boundary("").is_err());
        assert!(writer.set_boundary("trailing ").is_err());
        assert!(writer.set_boundary("semi;colon").is_err());
    }

    #[test]
    fn test_random_boundary() {
        let a = Writer::new(Vec::new()).unwrap();
        let b = Writer::new(Vec::new()).unwrap();
        assert_eq!(a.boundary().len(), 60);
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn test_content_type_quoting() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.set_boundary("plain-token").unwrap();
        assert_eq!(writer.content_type(), "multipart/form-data; boundary=plain-token");

        writer.set_boundary("has space").unwrap();
        assert_eq!(writer.content_type(), "multipart/form-data; boundary=\"has space\"");
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape_quotes("hello").unwrap(), "hello");
        assert_eq!(escape_quotes("hel\"lo").unwrap(), "hel\\\"lo");
        assert_eq!(escape_quotes("hel\\lo").unwrap(), "hel\\\\lo");
        assert!(matches!(escape_quotes("two\r\nlines"), Err(Error::Multipart(_))));
        assert!(matches!(escape_quotes("lf\n"), Err(Error::Multipart(_))));
    }

    #[tokio::test]
    async fn test_escaped_names_decode_back() {
        let file = FileField {
            body: Bytes::from_static(b"%PDF-1.4"),
            file_name: r"C:\tmp\a.pdf".to_string(),
            encoding: "binary".to_string(),
            mime_type: "application/pdf".to_string(),
        };

        let mut writer = Writer::new(Vec::new()).unwrap();
        let content_type = writer.content_type();
        writer.write_field(r#"say "hi""#, "hello").await.unwrap();
        writer.write_file(r"dir\doc", &file).await.unwrap();
        let output = writer.close().await.unwrap();

        let form = crate::decode(&output, &content_type).unwrap();
        assert_eq!(form.text(r#"say "hi""#), Some("hello"));
        let decoded = form.file(r"dir\doc").unwrap();
        assert_eq!(decoded.file_name, r"C:\tmp\a.pdf");
        assert_eq!(decoded, &file);
    }

    #[tokio::test]
    async fn test_line_break_in_name_rejected() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        let err = writer.write_field("a\r\nX-Injected: 1", "v").await.unwrap_err();
        assert!(matches!(err, Error::Multipart(_)));

        let file = FileField {
            body: Bytes::from_static(b"GIF89a"),
            file_name: "evil\n.gif".to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            mime_type: "image/gif".to_string(),
        };
        assert!(writer.write_file("img", &file).await.is_err());
    }
}
