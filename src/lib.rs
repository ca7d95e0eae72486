//! `multipart/form-data` decoding for upload endpoints.
//!
//! This crate provides:
//! - A buffered form-data decoder producing text and file fields
//! - MIME type detection for uploads by magic number, not client metadata
//! - Body accumulation from async readers and chunk streams, with size limits
//! - An async form-data writer for clients and tests
//!
//! Decoding itself is synchronous and stateless; only body accumulation and
//! writing are async, using tokio.
//!
//! # Examples
//!
//! ```
//! use tokio_formdata::{decode, Field};
//!
//! let body = b"--xyz\r\n\
//! Content-Disposition: form-data; name=\"photo\"; filename=\"pic.png\"\r\n\
//! \r\n\
//! \x89PNG\r\n\x1a\n\r\n\
//! --xyz--\r\n";
//!
//! let form = decode(body, "multipart/form-data; boundary=xyz").unwrap();
//! let photo = form.file("photo").unwrap();
//! assert_eq!(photo.mime_type, "image/png");
//! assert_eq!(photo.encoding, "7bit");
//! assert!(matches!(form.get("photo"), Some(Field::File(_))));
//! ```

pub mod body;
pub mod content_type;
pub mod error;
pub mod form;
pub mod header;
pub mod multipart;
pub mod quotedprintable;
pub mod sniff;

// Re-export commonly used types
pub use body::{decode_reader, read_body, read_body_stream};
pub use content_type::{boundary_from_content_type, Boundary};
pub use error::{Error, ErrorKind, Result};
pub use form::{Field, FileField, Form};
pub use multipart::{decode, DecoderConfig, FormDecoder};
pub use sniff::sniff;
