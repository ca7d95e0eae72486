//! Quoted-printable decoding (RFC 2045), for file parts sent with
//! `Content-Transfer-Encoding: quoted-printable`.

use crate::error::{Error, Result};

/// Decodes a quoted-printable body.
///
/// Trailing whitespace on each line is dropped and a line ending in `=` is
/// joined to the next one. An `=` not followed by two hex digits is kept
/// literally. Hard line breaks are preserved as sent.
///
/// # Examples
///
/// ```
/// let decoded = tokio_formdata::quotedprintable::decode(b"Hello=20World").unwrap();
/// assert_eq!(decoded, b"Hello World");
/// ```
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len());
    for line in input.split_inclusive(|&b| b == b'\n') {
        decode_line(line, &mut output)?;
    }
    Ok(output)
}

fn decode_line(line: &[u8], output: &mut Vec<u8>) -> Result<()> {
    let ending: &[u8] = if line.ends_with(b"\r\n") {
        b"\r\n"
    } else if line.ends_with(b"\n") {
        b"\n"
    } else {
        b""
    };

    let mut content = line;
    while let Some((&last, rest)) = content.split_last() {
        if !matches!(last, b'\n' | b'\r' | b' ' | b'\t') {
            break;
        }
        content = rest;
    }

    let soft_break = content.last() == Some(&b'=');
    if soft_break {
        content = &content[..content.len() - 1];
    }

    let mut i = 0;
    while i < content.len() {
        let b = content[i];
        if b == b'=' {
            let mut byte = [0u8; 1];
            if let Some(digits) = content.get(i + 1..i + 3) {
                if hex::decode_to_slice(digits, &mut byte).is_ok() {
                    output.push(byte[0]);
                    i += 3;
                    continue;
                }
            }
            output.push(b'=');
        } else if (b < b' ' && b != b'\t' && b != b'\r') || b == 0x7f {
            return Err(Error::Encoding(format!(
                "invalid unescaped byte 0x{:02x} in quoted-printable body",
                b
            )));
        } else {
            output.push(b);
        }
        i += 1;
    }

    if !soft_break {
        output.extend_from_slice(ending);
    }
    Ok(())
}
