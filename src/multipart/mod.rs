//! Multipart form-data decoding and writing.

pub mod decoder;
pub mod writer;

pub use decoder::{decode, DecoderConfig, FormDecoder};
pub use writer::Writer;
