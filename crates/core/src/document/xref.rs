//! Cross-reference tables.
//!
//! A document carries one or more xref sections: classic ASCII tables
//! and, from PDF 1.5 on, xref *streams* whose binary entries may point
//! into compressed object containers. The resolver consults the loaded
//! tables in order.

use crate::error::{PdfError, Result};
use crate::model::{Dict, PdfObject};
use crate::parser::ObjectParser;
use rustc_hash::FxHashMap;

/// Where one object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// At a byte offset in the file.
    Offset { offset: usize, generation: u32 },
    /// Inside a compressed object container (an object stream).
    InContainer { container: u32 },
}

/// One loaded cross-reference section plus its trailer dictionary.
#[derive(Debug, Default)]
pub struct XRefTable {
    entries: FxHashMap<u32, XRefEntry>,
    pub trailer: Dict,
}

impl XRefTable {
    pub fn get(&self, number: u32) -> Option<XRefEntry> {
        self.entries.get(&number).copied()
    }

    pub fn object_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a classic `xref` section starting at `pos` in `data`.
pub fn parse_classic(data: &[u8], pos: usize) -> Result<XRefTable> {
    let section = data
        .get(pos..)
        .ok_or(PdfError::OffsetOutOfBounds {
            offset: pos,
            limit: data.len(),
        })?;
    if !section.starts_with(b"xref") {
        return Err(PdfError::malformed_at("expected 'xref' keyword", pos));
    }

    let mut table = XRefTable::default();
    let mut cursor = 4;

    loop {
        skip_whitespace(section, &mut cursor);
        if cursor >= section.len() {
            return Err(PdfError::malformed_at("xref section has no trailer", pos));
        }
        if section[cursor..].starts_with(b"trailer") {
            cursor += 7;
            break;
        }

        let start_number = read_number(section, &mut cursor, pos)?;
        skip_whitespace(section, &mut cursor);
        let count = read_number(section, &mut cursor, pos)?;

        let mut base = start_number;
        for i in 0..count {
            skip_whitespace(section, &mut cursor);
            let offset = read_number(section, &mut cursor, pos)?;
            skip_whitespace(section, &mut cursor);
            let generation = read_number(section, &mut cursor, pos)?;
            skip_whitespace(section, &mut cursor);

            let marker = *section.get(cursor).ok_or_else(|| {
                PdfError::malformed_at("xref entry truncated", pos + cursor)
            })?;
            cursor += 1;

            // Some writers start a subsection at 1 yet still emit the
            // object 0 free entry; realign so entries keep their ids.
            if i == 0 && base > 0 && marker == b'f' && offset == 0 && generation == 65535 {
                base -= 1;
            }

            match marker {
                b'n' => {
                    table.entries.insert(
                        (base + i) as u32,
                        XRefEntry::Offset {
                            offset,
                            generation: generation as u32,
                        },
                    );
                }
                b'f' => {}
                other => {
                    return Err(PdfError::malformed_token(
                        "xref entry marker must be 'n' or 'f'",
                        pos + cursor - 1,
                        (other as char).to_string(),
                    ));
                }
            }
        }
    }

    skip_whitespace(section, &mut cursor);
    let mut parser = ObjectParser::from_slice(&section[cursor..]);
    let trailer = parser.parse_object()?;
    table.trailer = trailer.as_dict()?.clone();

    Ok(table)
}

/// Parse a PDF 1.5 xref stream from its dictionary and decoded payload.
pub fn parse_stream(dict: &Dict, data: &[u8]) -> Result<XRefTable> {
    let widths = dict
        .get("W")
        .ok_or_else(|| PdfError::malformed("xref stream missing W"))?
        .as_array()?;
    if widths.len() != 3 {
        return Err(PdfError::malformed("xref stream W must have 3 elements"));
    }
    let w0 = field_width(&widths[0])?;
    let w1 = field_width(&widths[1])?;
    let w2 = field_width(&widths[2])?;
    let entry_size = w0
        .checked_add(w1)
        .and_then(|s| s.checked_add(w2))
        .ok_or_else(|| PdfError::malformed("xref stream W widths overflow"))?;
    if entry_size == 0 {
        return Err(PdfError::malformed("xref stream entry size is zero"));
    }

    let size = dict
        .get("Size")
        .ok_or_else(|| PdfError::malformed("xref stream missing Size"))?
        .as_int()? as usize;

    // Subsection index; defaults to one run covering [0, Size).
    let index: Vec<(u32, usize)> = match dict.get("Index") {
        Some(idx) => {
            let arr = idx.as_array()?;
            let mut pairs = Vec::with_capacity(arr.len() / 2);
            let mut i = 0;
            while i + 1 < arr.len() {
                pairs.push((arr[i].as_int()? as u32, arr[i + 1].as_int()? as usize));
                i += 2;
            }
            pairs
        }
        None => vec![(0, size)],
    };

    let mut table = XRefTable::default();
    let mut pos = 0;

    for (start_number, count) in index {
        for i in 0..count {
            if data.len() - pos < entry_size {
                return Err(PdfError::malformed(format!(
                    "xref stream payload exhausted after {} entries",
                    table.len()
                )));
            }
            let number = start_number + i as u32;

            let entry_type = if w0 > 0 {
                big_endian(&data[pos..pos + w0])
            } else {
                1
            };
            let field1 = big_endian(&data[pos + w0..pos + w0 + w1]);
            let field2 = big_endian(&data[pos + w0 + w1..pos + entry_size]);
            pos += entry_size;

            match entry_type {
                0 => {} // free
                1 => {
                    table.entries.insert(
                        number,
                        XRefEntry::Offset {
                            offset: field1 as usize,
                            generation: field2 as u32,
                        },
                    );
                }
                2 => {
                    table.entries.insert(
                        number,
                        XRefEntry::InContainer {
                            container: field1 as u32,
                        },
                    );
                }
                other => {
                    return Err(PdfError::malformed(format!(
                        "unknown xref stream entry type {other}"
                    )));
                }
            }
        }
    }

    // The stream dictionary doubles as the trailer.
    for (key, value) in dict {
        if !matches!(
            key.as_str(),
            "Length" | "Filter" | "DecodeParms" | "W" | "Index" | "Type"
        ) {
            table.trailer.insert(key.clone(), value.clone());
        }
    }

    Ok(table)
}

/// Trailer pointers to earlier sections: `(Prev, XRefStm)`.
pub fn chain_pointers(trailer: &Dict) -> (Option<usize>, Option<usize>) {
    let follow = |key: &str| {
        trailer
            .get(key)
            .and_then(|p| p.as_int().ok())
            .filter(|&n| n >= 0)
            .map(|n| n as usize)
    };
    (follow("Prev"), follow("XRefStm"))
}

fn skip_whitespace(data: &[u8], cursor: &mut usize) {
    while *cursor < data.len() && matches!(data[*cursor], b' ' | b'\t' | b'\r' | b'\n') {
        *cursor += 1;
    }
}

fn read_number(data: &[u8], cursor: &mut usize, base: usize) -> Result<usize> {
    let start = *cursor;
    while *cursor < data.len() && data[*cursor].is_ascii_digit() {
        *cursor += 1;
    }
    if start == *cursor {
        return Err(PdfError::malformed_at(
            "expected a number in xref section",
            base + start,
        ));
    }
    std::str::from_utf8(&data[start..*cursor])
        .expect("digits are ascii")
        .parse()
        .map_err(|_| PdfError::malformed_at("xref number overflows", base + start))
}

/// One `W` element as a byte count; negative widths are malformed.
fn field_width(obj: &PdfObject) -> Result<usize> {
    usize::try_from(obj.as_int()?)
        .map_err(|_| PdfError::malformed("xref stream W width is negative"))
}

/// Big-endian integer from a variable-width field.
fn big_endian(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &[u8] = b"xref\n0 3\n0000000000 65535 f \n0000000017 00000 n \n0000000081 00000 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\n";

    #[test]
    fn classic_table() {
        let table = parse_classic(CLASSIC, 0).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(1),
            Some(XRefEntry::Offset {
                offset: 17,
                generation: 0
            })
        );
        assert_eq!(table.get(0), None); // free entry
        assert_eq!(table.trailer.get("Size").unwrap().as_int().unwrap(), 3);
    }

    #[test]
    fn classic_subsection_off_by_one_realigns() {
        let data = b"xref\n1 2\n0000000000 65535 f \n0000000100 00000 n \ntrailer\n<< /Size 2 >>\n";
        let table = parse_classic(data, 0).unwrap();
        // The free entry belonged to object 0, so the live one is object 1.
        assert_eq!(
            table.get(1),
            Some(XRefEntry::Offset {
                offset: 100,
                generation: 0
            })
        );
    }

    #[test]
    fn classic_rejects_bad_marker() {
        let data = b"xref\n0 1\n0000000000 00000 x \ntrailer\n<< >>\n";
        assert!(parse_classic(data, 0).is_err());
    }

    #[test]
    fn stream_entries_decode_offsets_and_containers() {
        let mut dict = Dict::new();
        dict.insert(
            "W".into(),
            PdfObject::Array(vec![
                PdfObject::Int(1),
                PdfObject::Int(2),
                PdfObject::Int(1),
            ]),
        );
        dict.insert("Size".into(), PdfObject::Int(3));
        dict.insert("Root".into(), PdfObject::Ref(crate::model::ObjRef::new(1, 0)));

        // type 0 (free), type 1 offset 0x0120 gen 0, type 2 container 5.
        let payload = [
            0u8, 0, 0, 0, //
            1, 0x01, 0x20, 0, //
            2, 0x00, 0x05, 0,
        ];
        let table = parse_stream(&dict, &payload).unwrap();
        assert_eq!(
            table.get(1),
            Some(XRefEntry::Offset {
                offset: 0x120,
                generation: 0
            })
        );
        assert_eq!(table.get(2), Some(XRefEntry::InContainer { container: 5 }));
        assert!(table.trailer.contains_key("Root"));
        assert!(!table.trailer.contains_key("W"));
    }

    #[test]
    fn stream_rejects_negative_field_width() {
        let mut dict = Dict::new();
        dict.insert(
            "W".into(),
            PdfObject::Array(vec![
                PdfObject::Int(1),
                PdfObject::Int(-1),
                PdfObject::Int(1),
            ]),
        );
        dict.insert("Size".into(), PdfObject::Int(1));
        let err = parse_stream(&dict, &[1, 0, 0]).unwrap_err();
        assert!(err.is_malformation());
    }

    #[test]
    fn stream_payload_exhaustion_is_malformed() {
        let mut dict = Dict::new();
        dict.insert(
            "W".into(),
            PdfObject::Array(vec![
                PdfObject::Int(1),
                PdfObject::Int(2),
                PdfObject::Int(1),
            ]),
        );
        dict.insert("Size".into(), PdfObject::Int(3));
        assert!(parse_stream(&dict, &[1, 0, 0, 0]).is_err());
    }
}
