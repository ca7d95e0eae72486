//! Error types for form decoding.

use std::fmt;
use std::io;
use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The `Content-Type` header is missing or is not `multipart/form-data`.
    #[error("Invalid content type")]
    InvalidContentType {
        /// The header value that was rejected.
        found: String,
    },

    /// The `Content-Type` header carries no usable `boundary` parameter.
    #[error("No boundary found")]
    MissingBoundary,

    /// No signature matched the leading bytes of an uploaded file.
    #[error("Mime type unknown")]
    UnknownMimeType,

    /// The request body exceeds the configured size.
    #[error("Message too large: limit is {limit} bytes")]
    MessageTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The form declares more distinct fields than allowed.
    #[error("Too many fields: limit is {limit}")]
    TooManyFields {
        /// The configured field limit.
        limit: usize,
    },

    /// Transfer-encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Multipart writer error
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Discriminates [`Error`] values without matching on their payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidContentType,
    MissingBoundary,
    UnknownMimeType,
    MessageTooLarge,
    TooManyFields,
    Encoding,
    Multipart,
    Io,
}

impl ErrorKind {
    /// Stable name of the kind, suitable for machine-readable error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidContentType => "invalid_content_type",
            ErrorKind::MissingBoundary => "missing_boundary",
            ErrorKind::UnknownMimeType => "unknown_mime_type",
            ErrorKind::MessageTooLarge => "message_too_large",
            ErrorKind::TooManyFields => "too_many_fields",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Multipart => "multipart",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidContentType { .. } => ErrorKind::InvalidContentType,
            Error::MissingBoundary => ErrorKind::MissingBoundary,
            Error::UnknownMimeType => ErrorKind::UnknownMimeType,
            Error::MessageTooLarge { .. } => ErrorKind::MessageTooLarge,
            Error::TooManyFields { .. } => ErrorKind::TooManyFields,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Multipart(_) => ErrorKind::Multipart,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the free-text detail carried by this error, if any.
    ///
    /// The [`Display`](fmt::Display) output is meant for clients; the detail
    /// holds what was actually rejected and is meant for logs.
    pub fn detail(&self) -> Option<String> {
        match self {
            Error::InvalidContentType { found } => Some(found.clone()),
            Error::MessageTooLarge { limit } | Error::TooManyFields { limit } => {
                Some(limit.to_string())
            }
            Error::Encoding(detail) | Error::Multipart(detail) => Some(detail.clone()),
            Error::Io(err) => Some(err.to_string()),
            Error::MissingBoundary | Error::UnknownMimeType => None,
        }
    }
}

/// Specialized Result type for form operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidContentType {
            found: "text/plain".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid content type");

        assert_eq!(Error::MissingBoundary.to_string(), "No boundary found");
        assert_eq!(Error::UnknownMimeType.to_string(), "Mime type unknown");

        let err = Error::MessageTooLarge { limit: 10 };
        assert_eq!(err.to_string(), "Message too large: limit is 10 bytes");

        let err = Error::Encoding("bad base64".to_string());
        assert_eq!(err.to_string(), "Encoding error: bad base64");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::MissingBoundary.kind(), ErrorKind::MissingBoundary);
        assert_eq!(Error::UnknownMimeType.kind(), ErrorKind::UnknownMimeType);
        assert_eq!(
            Error::TooManyFields { limit: 1 }.kind(),
            ErrorKind::TooManyFields
        );
        assert_eq!(ErrorKind::MissingBoundary.as_str(), "missing_boundary");
        assert_eq!(ErrorKind::UnknownMimeType.to_string(), "unknown_mime_type");
    }

    #[test]
    fn test_error_detail() {
        let err = Error::InvalidContentType {
            found: "application/json".to_string(),
        };
        assert_eq!(err.detail().as_deref(), Some("application/json"));
        assert_eq!(Error::MissingBoundary.detail(), None);
        assert_eq!(
            Error::MessageTooLarge { limit: 42 }.detail().as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("connection reset"));
    }
}
