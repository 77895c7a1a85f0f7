//! Compressed object containers (object streams, `/Type /ObjStm`).
//!
//! An object stream packs many small indirect objects into one filtered
//! payload, fronted by N whitespace-separated (object number, offset)
//! integer pairs. The offsets are relative to `/First`. The index is
//! built at construction, so a container that exists is always usable
//! for extraction.

use crate::error::{PdfError, Result};
use crate::model::{Dict, ObjRef, PdfObject, StreamObject};
use crate::parser::ObjectParser;
use bytes::Bytes;
use rustc_hash::FxHashMap;

/// Type marker a container's dictionary must carry.
pub const TYPE_MARKER: &str = "ObjStm";

/// A loaded, indexed object stream.
#[derive(Debug)]
pub struct ObjectStream {
    /// Decoded payload (header pairs + serialized object bodies).
    payload: Bytes,
    /// Offset of the first object body within the payload.
    first: usize,
    /// Declared object count.
    count: usize,
    /// object number -> offset relative to `first`
    index: FxHashMap<u32, usize>,
    /// Container this one extends, if any. Parsed but not consulted;
    /// chained extraction is deliberately out of scope.
    extends: Option<ObjRef>,
}

impl ObjectStream {
    /// Pure predicate: does this dictionary describe an object stream?
    ///
    /// Checks the `/Type` sentinel and that `/N` and `/First` are
    /// present and integers. Never raises; a failed check is just
    /// `false`.
    pub fn validate(dict: &Dict) -> bool {
        matches!(dict.get("Type"), Some(PdfObject::Name(name)) if name == TYPE_MARKER)
            && matches!(dict.get("N"), Some(PdfObject::Int(n)) if *n >= 0)
            && matches!(dict.get("First"), Some(PdfObject::Int(f)) if *f >= 0)
    }

    /// Build a container from a validated stream dictionary and its
    /// *decoded* payload, reading exactly N index pairs.
    pub fn load(stream: &StreamObject, payload: Vec<u8>) -> Result<Self> {
        if !Self::validate(&stream.dict) {
            return Err(PdfError::malformed(
                "stream dictionary is not an object stream",
            ));
        }
        // validate() guarantees both fields are non-negative ints.
        let count = stream.get("N").and_then(|n| n.as_int().ok()).unwrap_or(0) as usize;
        let first = stream
            .get("First")
            .and_then(|f| f.as_int().ok())
            .unwrap_or(0) as usize;

        let extends = stream
            .get("Extends")
            .and_then(|e| e.as_reference().ok());

        let payload = Bytes::from(payload);
        let index = Self::build_index(&payload, count)?;

        Ok(Self {
            payload,
            first,
            count,
            index,
            extends,
        })
    }

    /// Read exactly `count` (object number, offset) ASCII integer pairs
    /// from the head of the payload. Trailing bytes after the last pair
    /// are ignored.
    fn build_index(payload: &[u8], count: usize) -> Result<FxHashMap<u32, usize>> {
        let mut index =
            FxHashMap::with_capacity_and_hasher(count, Default::default());
        let mut cursor = 0usize;

        for pair in 0..count {
            let number = read_ascii_uint(payload, &mut cursor).ok_or_else(|| {
                PdfError::malformed(format!(
                    "object stream index exhausted after {pair} of {count} pairs"
                ))
            })?;
            let offset = read_ascii_uint(payload, &mut cursor).ok_or_else(|| {
                PdfError::malformed(format!(
                    "object stream index pair {pair} is missing its offset"
                ))
            })?;
            index.insert(number as u32, offset);
        }

        Ok(index)
    }

    /// Declared object count.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether `number` is stored in this container.
    pub fn contains(&self, number: u32) -> bool {
        self.index.contains_key(&number)
    }

    /// The container this one extends, informational only.
    pub fn extends(&self) -> Option<ObjRef> {
        self.extends
    }

    /// Extract one object by number.
    ///
    /// `Ok(None)` when the number is not in the index - callers must
    /// distinguish "not in this container" from a malformed container,
    /// and no seek or parse is attempted in that case. An indexed offset
    /// that lands at or past the payload end is the specific
    /// out-of-bounds malformation.
    pub fn extract(&self, number: u32) -> Result<Option<PdfObject>> {
        let Some(&relative) = self.index.get(&number) else {
            return Ok(None);
        };

        let offset = self.first.checked_add(relative).unwrap_or(usize::MAX);
        if offset >= self.payload.len() {
            return Err(PdfError::OffsetOutOfBounds {
                offset,
                limit: self.payload.len(),
            });
        }

        let mut parser = ObjectParser::new(self.payload.clone());
        parser.seek(offset);
        parser.parse_object().map(Some)
    }
}

/// Read one whitespace-delimited ASCII unsigned integer.
fn read_ascii_uint(data: &[u8], cursor: &mut usize) -> Option<usize> {
    while *cursor < data.len() && data[*cursor].is_ascii_whitespace() {
        *cursor += 1;
    }
    let start = *cursor;
    while *cursor < data.len() && data[*cursor].is_ascii_digit() {
        *cursor += 1;
    }
    if start == *cursor {
        return None;
    }
    std::str::from_utf8(&data[start..*cursor])
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dict;

    fn objstm_dict(n: i64, first: i64) -> Dict {
        let mut dict = Dict::new();
        dict.insert("Type".into(), PdfObject::Name("ObjStm".into()));
        dict.insert("N".into(), PdfObject::Int(n));
        dict.insert("First".into(), PdfObject::Int(first));
        dict
    }

    fn stream_with(dict: Dict) -> StreamObject {
        StreamObject::new(dict, Bytes::new(), 0)
    }

    #[test]
    fn validate_is_a_predicate_not_a_parse() {
        assert!(ObjectStream::validate(&objstm_dict(2, 10)));

        let mut wrong_type = objstm_dict(2, 10);
        wrong_type.insert("Type".into(), PdfObject::Name("XRef".into()));
        assert!(!ObjectStream::validate(&wrong_type));

        let mut missing_n = objstm_dict(2, 10);
        missing_n.shift_remove("N");
        assert!(!ObjectStream::validate(&missing_n));

        let mut real_first = objstm_dict(2, 10);
        real_first.insert("First".into(), PdfObject::Real(10.0));
        assert!(!ObjectStream::validate(&real_first));
    }

    #[test]
    fn index_and_extract() {
        // The worked scenario: N=2, First=10, pairs "7 0 12 5".
        let payload = b"7 0 12 5  123  << /X 1 >>".to_vec();
        let container = ObjectStream::load(&stream_with(objstm_dict(2, 10)), payload).unwrap();

        assert!(container.contains(7));
        assert!(container.contains(12));
        let obj = container.extract(7).unwrap().unwrap();
        assert_eq!(obj.as_int().unwrap(), 123);

        // Object 12 lives at first + 5 = offset 15.
        let obj = container.extract(12).unwrap().unwrap();
        assert_eq!(obj.as_dict().unwrap().get("X").unwrap().as_int().unwrap(), 1);

        // Absent is a result, not an error.
        assert!(container.extract(99).unwrap().is_none());
    }

    #[test]
    fn short_index_is_malformed() {
        let payload = b"7 0 12".to_vec();
        let err = ObjectStream::load(&stream_with(objstm_dict(2, 10)), payload).unwrap_err();
        assert!(matches!(err, PdfError::Malformed { .. }));
    }

    #[test]
    fn non_numeric_index_is_malformed() {
        let payload = b"7 zero".to_vec();
        assert!(ObjectStream::load(&stream_with(objstm_dict(1, 8)), payload).is_err());
    }

    #[test]
    fn trailing_bytes_after_pairs_are_ignored() {
        let payload = b"7 0 junk that is never read as index 42".to_vec();
        let container = ObjectStream::load(&stream_with(objstm_dict(1, 4)), payload).unwrap();
        assert_eq!(container.count(), 1);
        assert!(container.contains(7));
    }

    #[test]
    fn corrupt_offset_is_specifically_out_of_bounds() {
        let payload = b"7 9000 filler".to_vec();
        let container = ObjectStream::load(&stream_with(objstm_dict(1, 5)), payload).unwrap();
        let err = container.extract(7).unwrap_err();
        assert!(matches!(err, PdfError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn overflowing_offset_is_out_of_bounds() {
        let payload = format!("7 {} filler", usize::MAX).into_bytes();
        let container = ObjectStream::load(&stream_with(objstm_dict(1, 24)), payload).unwrap();
        let err = container.extract(7).unwrap_err();
        assert!(matches!(err, PdfError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn extends_is_informational() {
        let mut dict = objstm_dict(1, 4);
        dict.insert("Extends".into(), PdfObject::Ref(ObjRef::new(40, 0)));
        let container =
            ObjectStream::load(&stream_with(dict), b"7 0 null".to_vec()).unwrap();
        assert_eq!(container.extends(), Some(ObjRef::new(40, 0)));
    }
}
