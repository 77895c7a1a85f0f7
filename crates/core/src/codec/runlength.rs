//! RunLength stream decoder.

use crate::error::{PdfError, Result};

/// Decode run-length data.
///
/// Length byte 0-127 copies the next length+1 bytes literally; 129-255
/// repeats the next byte 257-length times; 128 is end of data. Input
/// that ends mid-run is a malformation.
pub fn runlength_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i];
        i += 1;

        match length {
            128 => return Ok(result),
            0..=127 => {
                let count = length as usize + 1;
                if i + count > data.len() {
                    return Err(PdfError::malformed("run-length literal run truncated"));
                }
                result.extend_from_slice(&data[i..i + count]);
                i += count;
            }
            129..=255 => {
                if i >= data.len() {
                    return Err(PdfError::malformed("run-length repeat run truncated"));
                }
                let count = 257 - length as usize;
                result.extend(std::iter::repeat_n(data[i], count));
                i += 1;
            }
        }
    }

    Ok(result)
}
