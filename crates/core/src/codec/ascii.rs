//! ASCIIHex and ASCII85 stream decoders.

use crate::error::{PdfError, Result};

/// Decode ASCIIHex data. Whitespace is ignored, `>` ends the data, and
/// an odd trailing digit is padded with zero.
pub fn asciihex_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for (pos, &byte) in data.iter().enumerate() {
        match byte {
            b'>' => break,
            b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c' => {}
            c if c.is_ascii_hexdigit() => {
                let nibble = hex_nibble(c);
                match pending.take() {
                    Some(high) => result.push((high << 4) | nibble),
                    None => pending = Some(nibble),
                }
            }
            c => {
                return Err(PdfError::malformed_token(
                    "invalid character in ASCIIHex data",
                    pos,
                    (c as char).to_string(),
                ));
            }
        }
    }

    if let Some(high) = pending {
        result.push(high << 4);
    }
    Ok(result)
}

fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

/// Decode ASCII85 data (PDF variant): `z` shorthand for four zero
/// bytes, optional `<~ ... ~>` framing, whitespace ignored.
pub fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut group = [0u8; 5];
    let mut filled = 0usize;
    let mut result = Vec::with_capacity(data.len() * 4 / 5);

    for (pos, &byte) in data.iter().enumerate() {
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c' => {}
            b'z' if filled == 0 => result.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[filled] = byte;
                filled += 1;
                if filled == 5 {
                    push_group(&group, 5, &mut result);
                    filled = 0;
                }
            }
            c => {
                return Err(PdfError::malformed_token(
                    "invalid character in ASCII85 data",
                    pos,
                    (c as char).to_string(),
                ));
            }
        }
    }

    if filled == 1 {
        return Err(PdfError::malformed("truncated ASCII85 group"));
    }
    if filled > 1 {
        let mut padded = [b'u'; 5];
        padded[..filled].copy_from_slice(&group[..filled]);
        push_group(&padded, filled, &mut result);
    }

    Ok(result)
}

fn push_group(group: &[u8; 5], filled: usize, out: &mut Vec<u8>) {
    let mut value: u32 = 0;
    for &byte in group {
        value = value.wrapping_mul(85).wrapping_add(u32::from(byte - b'!'));
    }
    out.extend_from_slice(&value.to_be_bytes()[..filled - 1]);
}
