//! PDF object model.
//!
//! The document graph is a closed set of object variants. Edges that
//! cross indirect-object boundaries are unresolved [`ObjRef`]s until the
//! document session resolves them.

use crate::error::{PdfError, Result};
use bytes::Bytes;
use indexmap::IndexMap;

/// Maximum number of elements in an array under the implementation
/// limits of the format (PDF 1.4 Appendix C).
pub const ARRAY_LIMIT: usize = 8191;

/// Maximum encoded length of a name object in bytes.
pub const NAME_LIMIT: usize = 127;

/// Insertion-ordered dictionary type used throughout the object model.
pub type Dict = IndexMap<String, PdfObject>;

/// PDF object - the fundamental value type in a document graph.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    /// Null object
    Null,
    /// Boolean keyword (`true` / `false`)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object (e.g., /Type, /ObjStm)
    Name(String),
    /// String (byte array, literal or hex form)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (name -> object mapping, insertion order preserved)
    Dict(Dict),
    /// Stream (dictionary + raw byte window into the source)
    Stream(Box<StreamObject>),
    /// Indirect object reference; not a value until resolved
    Ref(ObjRef),
}

impl PdfObject {
    /// Check if this is the null object.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a simple object: the wrapper around exactly one
    /// lexical token (null, boolean, number, name or string).
    pub const fn is_simple(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Real(_)
                | Self::Name(_)
                | Self::String(_)
        )
    }

    /// Get as boolean.
    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(PdfError::TypeError {
                expected: "bool",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as integer.
    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "int",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as real (float).
    pub const fn as_real(&self) -> Result<f64> {
        match self {
            Self::Real(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "real",
                got: self.kind_name(),
            }),
        }
    }

    /// Get numeric value (int or real coerced to f64).
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "number",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as name string.
    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "name",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as byte string.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "string",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as array.
    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(PdfError::TypeError {
                expected: "array",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as dictionary.
    pub fn as_dict(&self) -> Result<&Dict> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(PdfError::TypeError {
                expected: "dict",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as stream.
    pub fn as_stream(&self) -> Result<&StreamObject> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "stream",
                got: self.kind_name(),
            }),
        }
    }

    /// Get as indirect reference.
    pub const fn as_reference(&self) -> Result<ObjRef> {
        match self {
            Self::Ref(r) => Ok(*r),
            _ => Err(PdfError::TypeError {
                expected: "ref",
                got: self.kind_name(),
            }),
        }
    }

    /// Kind name for error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Stream(_) => "stream",
            Self::Ref(_) => "ref",
        }
    }

    /// Interpret an array as a 4-element numeric rectangle.
    ///
    /// Returns `Some` iff this is an array of exactly four numbers; any
    /// other shape (including non-arrays) is "not a rectangle", never an
    /// error.
    pub fn rectangle(&self) -> Option<[f64; 4]> {
        let arr = match self {
            Self::Array(arr) if arr.len() == 4 => arr,
            _ => return None,
        };
        let mut rect = [0.0; 4];
        for (slot, element) in rect.iter_mut().zip(arr) {
            *slot = element.as_num().ok()?;
        }
        Some(rect)
    }

    /// Best-effort text projection of an array: the simple elements,
    /// space separated, in order. Compound elements and references are
    /// skipped silently, so an array holding only skipped elements is
    /// indistinguishable from an empty one.
    pub fn simple_values_text(&self) -> String {
        let arr = match self {
            Self::Array(arr) => arr,
            _ => return String::new(),
        };
        let mut out = String::new();
        for element in arr {
            let piece = match element {
                Self::Null => "null".to_string(),
                Self::Bool(b) => b.to_string(),
                Self::Int(n) => n.to_string(),
                Self::Real(n) => n.to_string(),
                Self::Name(s) => s.clone(),
                Self::String(s) => String::from_utf8_lossy(s).into_owned(),
                _ => continue,
            };
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&piece);
        }
        out
    }

    /// Pure predicate for the format's implementation limits: arrays at
    /// most [`ARRAY_LIMIT`] elements, names at most [`NAME_LIMIT`] bytes.
    /// Other kinds carry no limit at this layer.
    pub fn within_limits(&self) -> bool {
        match self {
            Self::Array(arr) => arr.len() <= ARRAY_LIMIT,
            Self::Name(name) => name.len() <= NAME_LIMIT,
            _ => true,
        }
    }
}

/// PDF indirect object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u32,
}

impl ObjRef {
    pub const fn new(number: u32, generation: u32) -> Self {
        Self { number, generation }
    }
}

impl std::fmt::Display for ObjRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// PDF stream: parameter dictionary plus a byte window into the backing
/// source.
///
/// `raw` is bounded exactly to the declared payload; reads cannot run
/// into adjacent file content. The bytes stay filtered until passed
/// through [`crate::codec::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamObject {
    /// Stream parameter dictionary
    pub dict: Dict,
    /// Raw (still filtered) payload window
    raw: Bytes,
    /// Byte offset of the payload in the backing source, for diagnostics
    pub start: usize,
    /// Object number, when independently addressable
    pub number: Option<u32>,
    /// Generation number
    pub generation: Option<u32>,
}

impl StreamObject {
    pub fn new(dict: Dict, raw: Bytes, start: usize) -> Self {
        Self {
            dict,
            raw,
            start,
            number: None,
            generation: None,
        }
    }

    /// Record the owning indirect object's identity.
    pub const fn set_identity(&mut self, number: u32, generation: u32) {
        self.number = Some(number);
        self.generation = Some(generation);
    }

    /// Raw (still filtered) payload bytes.
    pub fn raw_data(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Raw payload as a shared, zero-copy window.
    pub fn raw_window(&self) -> Bytes {
        self.raw.clone()
    }

    /// Declared payload length.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Dictionary lookup.
    pub fn get(&self, name: &str) -> Option<&PdfObject> {
        self.dict.get(name)
    }

    /// The ordered filter chain declared by `/Filter`: a single name or
    /// an array of names. Entries of any other kind are skipped.
    pub fn filters(&self) -> Vec<String> {
        match self.dict.get("Filter") {
            Some(PdfObject::Name(name)) => vec![name.clone()],
            Some(PdfObject::Array(arr)) => arr
                .iter()
                .filter_map(|f| f.as_name().ok().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
