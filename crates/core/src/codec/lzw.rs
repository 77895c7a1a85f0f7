//! LZW stream decoder backed by the weezl crate.

use crate::error::{PdfError, Result};
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW data (PDF variant: MSB-first, 8-bit codes, EarlyChange=1).
pub fn lzw_decode(data: &[u8]) -> Result<Vec<u8>> {
    lzw_decode_with_early_change(data, true)
}

/// Decode LZW data with an explicit EarlyChange setting. EarlyChange=0
/// selects TIFF-style code size switching.
pub fn lzw_decode_with_early_change(data: &[u8], early_change: bool) -> Result<Vec<u8>> {
    let mut decoder = if early_change {
        Decoder::new(BitOrder::Msb, 8)
    } else {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    decoder
        .into_vec(&mut output)
        .decode(data)
        .status
        .map_err(|e| PdfError::malformed(format!("corrupt LZW payload: {e}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_sample() {
        // The worked example from the PDF specification's LZW section:
        // encodes the byte sequence 45 45 45 45 45 65 45 45 45 66.
        let data = [0x80, 0x0b, 0x60, 0x50, 0x22, 0x0c, 0x0c, 0x85, 0x01];
        let out = lzw_decode(&data).unwrap();
        assert_eq!(out, [0x45, 0x45, 0x45, 0x45, 0x45, 0x65, 0x45, 0x45, 0x45, 0x66]);
    }

    #[test]
    fn early_change_zero_decodes_short_samples_identically() {
        // The sample never reaches a code-width switch, so both
        // settings must agree on it.
        let data = [0x80, 0x0b, 0x60, 0x50, 0x22, 0x0c, 0x0c, 0x85, 0x01];
        let out = lzw_decode_with_early_change(&data, false).unwrap();
        assert_eq!(out, lzw_decode(&data).unwrap());
    }
}
