//! MIME type detection by content.
//!
//! Uploaded files are classified by their leading bytes ("magic numbers")
//! rather than by the client-supplied `Content-Type` or file extension.
//!
//! The leading bytes are rendered as lowercase hex and compared against a fixed
//! signature table in order; the first entry whose prefix matches wins. RIFF
//! containers share one prefix for several formats, so they are resolved by the
//! form tag stored at offset 8.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;

/// Number of leading bytes rendered for signature matching.
const SNIFF_LEN: usize = 16;

/// RIFF container signature ("RIFF").
const RIFF: &str = "52494646";

/// RIFF form tags found at bytes 8..12.
const RIFF_FORMS: &[(&str, &str)] = &[
    ("57415645", "audio/wav"), // "WAVE"
    ("41564920", "video/avi"), // "AVI "
];

/// Built-in signatures, as hex byte prefixes. Order is significant.
static BUILTIN_SIGNATURES: &[(&str, &str)] = &[
    ("89504e47", "image/png"),
    ("474946383761", "image/gif"), // GIF87a
    ("474946383961", "image/gif"), // GIF89a
    ("ffd8", "image/jpeg"),
    ("25504446", "application/pdf"),
    ("504b0304", "application/zip"),
    ("2e7261fd", "audio/vnd.rn-realaudio"),
    ("494433", "audio/mp3"), // ID3 tag
    ("fffb", "audio/mp3"),   // MPEG-1 layer III frame sync
    ("4f676753", "audio/ogg"),
    ("1a45dfa3", "video/webm"),
    ("000001ba", "video/mpeg"), // pack header
    ("000001b3", "video/mpeg"), // sequence header
    ("664c6143", "audio/flac"),
    ("41564920", "video/avi"),
    ("4d546864", "audio/midi"),
];

/// One entry of the signature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Lowercase hex rendering of the byte prefix.
    pub hex: String,
    /// The MIME type reported for a match.
    pub mime_type: &'static str,
}

/// The signature table, normalised once on first use.
static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    BUILTIN_SIGNATURES
        .iter()
        .map(|&(hex, mime_type)| Signature {
            hex: hex.to_ascii_lowercase(),
            mime_type,
        })
        .collect()
});

/// Returns the signature table in matching order.
pub fn signatures() -> impl Iterator<Item = &'static Signature> {
    SIGNATURES.iter()
}

/// Renders the first 16 bytes of `buf` (fewer if shorter) as lowercase hex.
///
/// # Examples
///
/// ```
/// use tokio_formdata::sniff::hex_prefix;
///
/// assert_eq!(hex_prefix(b"%PDF-1.7"), "255044462d312e37");
/// ```
pub fn hex_prefix(buf: &[u8]) -> String {
    hex::encode(&buf[..buf.len().min(SNIFF_LEN)])
}

/// Returns the MIME type of `buf`, judged by its leading bytes.
///
/// Fails with [`Error::UnknownMimeType`] when nothing in the signature table
/// matches and the buffer is not a recognised RIFF container.
///
/// # Examples
///
/// ```
/// use tokio_formdata::sniff;
///
/// assert_eq!(sniff(b"\x89PNG\r\n\x1a\n").unwrap(), "image/png");
/// assert!(sniff(&[0u8; 16]).is_err());
/// ```
pub fn sniff(buf: &[u8]) -> Result<&'static str> {
    let prefix = hex_prefix(buf);

    if let Some(sig) = SIGNATURES.iter().find(|sig| prefix.starts_with(sig.hex.as_str())) {
        return Ok(sig.mime_type);
    }

    if prefix.starts_with(RIFF) && buf.len() > 11 {
        let form = hex::encode(&buf[8..12]);
        if let Some(&(_, mime_type)) = RIFF_FORMS.iter().find(|&&(tag, _)| tag == form) {
            return Ok(mime_type);
        }
    }

    Err(Error::UnknownMimeType)
}
