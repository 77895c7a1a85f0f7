//! Stream filter decoders.
//!
//! - `ascii`: ASCIIHex and ASCII85 decoding
//! - `lzw`: LZW decompression
//! - `runlength`: run-length decoding
//!
//! FlateDecode and the PNG predictors live here in `mod.rs`, next to the
//! filter-chain dispatcher.

pub mod ascii;
pub mod lzw;
pub mod runlength;

pub use ascii::{ascii85_decode, asciihex_decode};
pub use lzw::lzw_decode;
pub use runlength::runlength_decode;

use crate::error::{PdfError, Result};
use std::io::Read;

/// The one filter the compressed-object-container path guarantees.
pub const FLATE: &str = "FlateDecode";

/// Apply a filter chain in order.
///
/// A filter outside the supported set fails with
/// [`PdfError::Unsupported`] naming it; a payload the filter cannot
/// decode fails with a malformation. The two outcomes stay
/// distinguishable for diagnostics.
pub fn decode(data: &[u8], filters: &[String]) -> Result<Vec<u8>> {
    decode_with_early_change(data, filters, true)
}

/// Apply a filter chain with an explicit LZW `EarlyChange` setting,
/// taken from the stream's `DecodeParms`. Filters other than LZW ignore
/// it.
pub fn decode_with_early_change(
    data: &[u8],
    filters: &[String],
    early_change: bool,
) -> Result<Vec<u8>> {
    let mut output = data.to_vec();
    for filter in filters {
        output = match filter.as_str() {
            "FlateDecode" | "Fl" => flate_decode(&output)?,
            "LZWDecode" | "LZW" => {
                lzw::lzw_decode_with_early_change(&output, early_change)?
            }
            "ASCIIHexDecode" | "AHx" => asciihex_decode(&output)?,
            "ASCII85Decode" | "A85" => ascii85_decode(&output)?,
            "RunLengthDecode" | "RL" => runlength_decode(&output)?,
            other => {
                tracing::debug!(filter = other, "unsupported stream filter");
                return Err(PdfError::Unsupported(format!("filter {other}")));
            }
        };
    }
    Ok(output)
}

/// Decode zlib/deflate data.
pub fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| PdfError::malformed(format!("corrupt FlateDecode payload: {e}")))?;
    Ok(output)
}

/// Undo a PNG predictor (predictor values 10-15) applied before
/// compression. `colors`, `bits` and `columns` come from the stream's
/// `DecodeParms`.
pub fn apply_png_predictor(
    data: &[u8],
    colors: usize,
    bits: usize,
    columns: usize,
) -> Result<Vec<u8>> {
    let bytes_per_pixel = (colors * bits).div_ceil(8).max(1);
    let row_len = (colors * bits * columns).div_ceil(8);
    let stride = row_len + 1;

    if row_len == 0 || data.len() % stride != 0 {
        return Err(PdfError::malformed("predictor data does not divide into rows"));
    }

    let mut output = Vec::with_capacity(data.len() - data.len() / stride);
    let mut prior = vec![0u8; row_len];

    for raw_row in data.chunks(stride) {
        let filter_type = raw_row[0];
        let mut row = raw_row[1..].to_vec();

        match filter_type {
            0 => {}
            1 => {
                for i in bytes_per_pixel..row_len {
                    row[i] = row[i].wrapping_add(row[i - bytes_per_pixel]);
                }
            }
            2 => {
                for i in 0..row_len {
                    row[i] = row[i].wrapping_add(prior[i]);
                }
            }
            3 => {
                for i in 0..row_len {
                    let left = if i >= bytes_per_pixel {
                        row[i - bytes_per_pixel]
                    } else {
                        0
                    };
                    let avg = (u16::from(left) + u16::from(prior[i])) / 2;
                    row[i] = row[i].wrapping_add(avg as u8);
                }
            }
            4 => {
                for i in 0..row_len {
                    let left = if i >= bytes_per_pixel {
                        row[i - bytes_per_pixel]
                    } else {
                        0
                    };
                    let up = prior[i];
                    let up_left = if i >= bytes_per_pixel {
                        prior[i - bytes_per_pixel]
                    } else {
                        0
                    };
                    row[i] = row[i].wrapping_add(paeth(left, up, up_left));
                }
            }
            other => {
                return Err(PdfError::malformed(format!(
                    "unknown PNG predictor row filter {other}"
                )));
            }
        }

        output.extend_from_slice(&row);
        prior.copy_from_slice(&row);
    }

    Ok(output)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (i16::from(a), i16::from(b), i16::from(c));
    let p = a + b - c;
    let (pa, pb, pc) = ((p - a).abs(), (p - b).abs(), (p - c).abs());
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}
