//! Buffered `multipart/form-data` decoder.
//!
//! The whole request body is decoded at once. Parts are the byte ranges
//! between consecutive delimiter occurrences; each is split at the first blank
//! line into a header block and a body, and turned into a text or file field.
//!
//! Malformed parts (no blank line, no `name` attribute) are skipped so that
//! the well-formed parts of the same body still come through. A file whose
//! type cannot be sniffed fails the whole decode.

use crate::content_type::boundary_from_content_type;
use crate::error::{Error, Result};
use crate::form::{Field, FileField, Form, DEFAULT_ENCODING};
use crate::header::HeaderBlock;
use crate::sniff::sniff;
use bytes::Bytes;
use memchr::memmem;

/// Body size limit of [`DecoderConfig::recommended`] (32 MB).
pub const RECOMMENDED_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

/// Field limit of [`DecoderConfig::recommended`].
pub const RECOMMENDED_MAX_FIELDS: usize = 1000;

const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";
const LINE_END_LEN: usize = 2;

/// Limits applied while decoding.
///
/// The default configuration is unlimited, so every well-formed body decodes.
/// Servers facing untrusted clients should start from
/// [`DecoderConfig::recommended`] or set their own limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    max_body_size: usize,
    max_fields: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_body_size: usize::MAX,
            max_fields: usize::MAX,
        }
    }
}

impl DecoderConfig {
    /// Creates an unlimited configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with limits suited to request handling:
    /// 32 MB of body and 1000 distinct field names.
    pub fn recommended() -> Self {
        Self {
            max_body_size: RECOMMENDED_MAX_BODY_SIZE,
            max_fields: RECOMMENDED_MAX_FIELDS,
        }
    }

    /// Sets the maximum accepted body size in bytes.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the maximum number of distinct field names.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }

    /// Returns the maximum accepted body size in bytes.
    pub fn body_size_limit(&self) -> usize {
        self.max_body_size
    }

    /// Returns the maximum number of distinct field names.
    pub fn field_limit(&self) -> usize {
        self.max_fields
    }
}

/// Decodes buffered `multipart/form-data` bodies.
///
/// A decoder holds no per-request state and may be shared between tasks.
#[derive(Debug, Clone, Default)]
pub struct FormDecoder {
    config: DecoderConfig,
}

impl FormDecoder {
    /// Creates a decoder with the given limits.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the decoder's limits.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `body` according to the boundary declared in `content_type`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidContentType`] if the header is not `multipart/form-data`
    /// - [`Error::MissingBoundary`] if it has no boundary parameter
    /// - [`Error::MessageTooLarge`] if the body exceeds the configured size
    /// - [`Error::TooManyFields`] if more distinct names than allowed are decoded
    /// - [`Error::UnknownMimeType`] if any file part cannot be classified
    pub fn decode(&self, body: &[u8], content_type: &str) -> Result<Form> {
        let boundary = boundary_from_content_type(content_type)?;
        if body.len() > self.config.max_body_size {
            return Err(Error::MessageTooLarge {
                limit: self.config.max_body_size,
            });
        }

        let delimiter = boundary.delimiter();
        let finder = memmem::Finder::new(&delimiter);
        let mut form = Form::new();

        let Some(mut start) = finder.find(body).map(|pos| pos + delimiter.len()) else {
            log::debug!("multipart body contains no delimiter");
            return Ok(form);
        };

        while let Some(pos) = finder.find(&body[start..]) {
            let part = &body[start..start + pos];
            start += pos + delimiter.len();

            if let Some((name, field)) = decode_part(part)? {
                if !form.contains(&name) && form.len() >= self.config.max_fields {
                    return Err(Error::TooManyFields {
                        limit: self.config.max_fields,
                    });
                }
                log::trace!("decoded form field {:?}", name);
                form.insert(name, field);
            }
        }

        Ok(form)
    }
}

/// Decodes `body` without size or field limits.
///
/// # Examples
///
/// ```
/// let body = b"--xyz\r\n\
/// Content-Disposition: form-data; name=\"note\"\r\n\
/// \r\n\
/// hello\r\n\
/// --xyz--\r\n";
///
/// let form = tokio_formdata::decode(body, "multipart/form-data; boundary=xyz").unwrap();
/// assert_eq!(form.text("note"), Some("hello"));
/// ```
pub fn decode(body: &[u8], content_type: &str) -> Result<Form> {
    FormDecoder::default().decode(body, content_type)
}

/// Turns the raw bytes between two delimiters into a named field.
///
/// Returns `Ok(None)` for parts that should be skipped.
fn decode_part(part: &[u8]) -> Result<Option<(String, Field)>> {
    let Some(split) = memmem::find(part, HEADER_SEPARATOR) else {
        log::debug!("skipping multipart part without header separator");
        return Ok(None);
    };

    let header_text = String::from_utf8_lossy(&part[..split]);
    let body_start = split + HEADER_SEPARATOR.len();
    let body_end = part.len().saturating_sub(LINE_END_LEN).max(body_start);
    let body = &part[body_start..body_end];

    let header = HeaderBlock::new(&header_text);
    let name = match header.attribute("name") {
        Some(name) if !name.is_empty() => name.into_owned(),
        _ => {
            log::debug!("skipping multipart part without a name");
            return Ok(None);
        }
    };

    if !header.has_attribute("filename") {
        let value = String::from_utf8_lossy(body).into_owned();
        return Ok(Some((name, Field::Text(value))));
    }

    let mime_type = sniff(body).map_err(|err| {
        log::debug!("cannot classify upload in field {:?}", name);
        err
    })?;

    let file = FileField {
        body: Bytes::copy_from_slice(body),
        file_name: header.attribute("filename").unwrap_or_default().into_owned(),
        encoding: header
            .line_value("Content-Transfer-Encoding")
            .unwrap_or(DEFAULT_ENCODING)
            .to_string(),
        mime_type: mime_type.to_string(),
    };
    Ok(Some((name, Field::File(file))))
}
