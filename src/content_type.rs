//! `Content-Type` handling for `multipart/form-data` requests.
//!
//! Only the boundary parameter matters to the decoder; other parameters are
//! parsed and ignored.

use crate::error::{Error, Result};

/// The media type every accepted request must declare.
pub const FORM_DATA: &str = "multipart/form-data";

/// A multipart boundary token as declared in the `Content-Type` header.
///
/// The token is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(Vec<u8>);

impl Boundary {
    /// Creates a boundary from its token, rejecting empty tokens.
    pub fn new(token: impl Into<Vec<u8>>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::MissingBoundary);
        }
        Ok(Self(token))
    }

    /// Returns the raw token, without the leading dashes.
    pub fn token(&self) -> &[u8] {
        &self.0
    }

    /// Returns the delimiter that separates parts on the wire: `--` + token.
    pub fn delimiter(&self) -> Vec<u8> {
        let mut delimiter = Vec::with_capacity(self.0.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(&self.0);
        delimiter
    }
}

/// Extracts the boundary from a `Content-Type` header value.
///
/// The header must start with `multipart/form-data`; parameter names are
/// matched case-insensitively and quoted values are unquoted.
///
/// # Examples
///
/// ```
/// use tokio_formdata::boundary_from_content_type;
///
/// let boundary = boundary_from_content_type("multipart/form-data; boundary=xyz").unwrap();
/// assert_eq!(boundary.delimiter(), b"--xyz");
/// ```
pub fn boundary_from_content_type(header: &str) -> Result<Boundary> {
    if !header.starts_with(FORM_DATA) {
        return Err(Error::InvalidContentType {
            found: header.to_string(),
        });
    }

    let params = header.split_once(';').map_or("", |(_, rest)| rest);
    let token = params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()))
        .ok_or(Error::MissingBoundary)?;

    Boundary::new(token)
}

/// Removes one pair of surrounding double quotes, if present.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
