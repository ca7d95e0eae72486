//! Request body accumulation.
//!
//! The decoder works on a complete in-memory body. These helpers collect a
//! body from an async reader or a stream of chunks, bounded by a size limit,
//! and hand it to the decoder. Connection errors while reading surface as
//! [`Error::Io`].

use crate::content_type::boundary_from_content_type;
use crate::error::{Error, Result};
use crate::form::Form;
use crate::multipart::{DecoderConfig, FormDecoder};
use bytes::Bytes;
use futures::Stream;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;

/// Reads `reader` to the end, failing once more than `limit` bytes arrive.
pub async fn read_body<R: AsyncRead + Unpin>(reader: R, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    // One byte past the limit is enough to tell an exact fit from an overflow.
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(cap).read_to_end(&mut body).await?;

    if body.len() > limit {
        return Err(Error::MessageTooLarge { limit });
    }
    Ok(body)
}

/// Collects a stream of body chunks, failing once more than `limit` bytes arrive.
///
/// An `Err` item from the stream aborts collection and is returned as [`Error::Io`].
pub async fn read_body_stream<S>(stream: S, limit: usize) -> Result<Vec<u8>>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    read_body(StreamReader::new(stream), limit).await
}

/// Validates `content_type`, reads the whole body and decodes it.
///
/// The content type is checked before anything is read, so a request with the
/// wrong type or no boundary is rejected without consuming its body.
pub async fn decode_reader<R: AsyncRead + Unpin>(
    reader: R,
    content_type: &str,
    config: &DecoderConfig,
) -> Result<Form> {
    boundary_from_content_type(content_type)?;
    let body = read_body(reader, config.body_size_limit()).await?;
    log::debug!("read multipart body of {} bytes", body.len());
    FormDecoder::new(config.clone()).decode(&body, content_type)
}
