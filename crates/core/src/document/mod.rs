//! Document session: source handling, cross-reference loading and
//! indirect object resolution.
//!
//! One [`Document`] is one validation session over one random-access
//! byte source. All session state (parser cursor, object cache,
//! container cache) is single-threaded by design; independent documents
//! validate on independent threads.

pub mod objstm;
pub mod xref;

use crate::codec;
use crate::error::{PdfError, Result};
use crate::model::{Dict, ObjRef, PdfObject, StreamObject};
use crate::parser::ObjectParser;
use bytes::Bytes;
use indexmap::IndexMap;
use memmap2::Mmap;
use objstm::ObjectStream;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use xref::{XRefEntry, XRefTable};

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// How far from the end of file `startxref` may sit.
const STARTXREF_WINDOW: usize = 1024;

/// Small LRU over resolved objects; resolution stays idempotent per
/// session because hits return the same shared value.
#[derive(Debug)]
struct ObjectCache {
    capacity: usize,
    map: IndexMap<u32, Rc<PdfObject>>,
}

impl ObjectCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: IndexMap::new(),
        }
    }

    fn get(&mut self, number: u32) -> Option<Rc<PdfObject>> {
        if self.capacity == 0 {
            return None;
        }
        let pos = self.map.get_index_of(&number)?;
        let value = Rc::clone(self.map.get_index(pos)?.1);
        if pos + 1 != self.map.len() {
            self.map.move_index(pos, self.map.len() - 1);
        }
        Some(value)
    }

    fn insert(&mut self, number: u32, value: Rc<PdfObject>) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&number) {
            self.map.shift_remove(&number);
        }
        self.map.insert(number, value);
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }
}

/// One parsed document and its per-session resolution state.
#[derive(Debug)]
pub struct Document {
    data: Bytes,
    xrefs: Vec<XRefTable>,
    catalog: Option<Dict>,
    cache: RefCell<ObjectCache>,
    containers: RefCell<FxHashMap<u32, Rc<ObjectStream>>>,
    resolving: RefCell<FxHashSet<u32>>,
}

impl Document {
    /// Open a file-backed session. The mapping is owned by the session
    /// and released on every exit path when the session drops.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the mapping is read-only and owned by the returned
        // Bytes for the whole session.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(Bytes::from_owner(mmap))
    }

    /// Open a session over shared bytes (zero-copy).
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        Self::with_cache_capacity(data, DEFAULT_CACHE_CAPACITY)
    }

    /// Open a session over a borrowed slice (copies once).
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Self::from_bytes(Bytes::copy_from_slice(data))
    }

    /// Open a session with an explicit object cache capacity.
    pub fn with_cache_capacity(data: Bytes, cache_capacity: usize) -> Result<Self> {
        let mut doc = Self {
            data,
            xrefs: Vec::new(),
            catalog: None,
            cache: RefCell::new(ObjectCache::new(cache_capacity)),
            containers: RefCell::new(FxHashMap::default()),
            resolving: RefCell::new(FxHashSet::default()),
        };
        doc.load()?;
        Ok(doc)
    }

    /// The raw document bytes.
    pub fn bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// The trailer dictionary of the most recent revision.
    pub fn trailer(&self) -> Option<&Dict> {
        self.xrefs.first().map(|x| &x.trailer)
    }

    /// The document catalog, when the trailer points at one.
    pub fn catalog(&self) -> Option<&Dict> {
        self.catalog.as_ref()
    }

    /// All cross-referenced object numbers, deduplicated, ascending.
    pub fn object_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .xrefs
            .iter()
            .flat_map(|x| x.object_numbers())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    /// Parse the document skeleton: startxref, the xref chain, and the
    /// catalog. Failures here are the final word on well-formedness and
    /// propagate to the caller.
    fn load(&mut self) -> Result<()> {
        let startxref = self.find_startxref()?;
        self.load_xref_chain(startxref)?;
        if self.xrefs.is_empty() {
            return Err(PdfError::NoValidXRef);
        }

        // First trailer with a Root wins; a document may legitimately
        // parse without one, which is a validity problem, not a
        // well-formedness one.
        for i in 0..self.xrefs.len() {
            let Some(root) = self.xrefs[i].trailer.get("Root").cloned() else {
                continue;
            };
            if let Ok(resolved) = self.resolve(&root)
                && let Ok(dict) = resolved.as_dict()
            {
                self.catalog = Some(dict.clone());
                break;
            }
        }

        tracing::debug!(
            tables = self.xrefs.len(),
            objects = self.object_numbers().len(),
            has_catalog = self.catalog.is_some(),
            "document skeleton loaded"
        );
        Ok(())
    }

    /// Locate the last `startxref` marker near the end of file and read
    /// the offset that follows it.
    fn find_startxref(&self) -> Result<usize> {
        let data = self.data.as_ref();
        let needle = b"startxref";
        if data.len() < needle.len() {
            return Err(PdfError::malformed("file too small to be a document"));
        }

        let window_start = data.len().saturating_sub(STARTXREF_WINDOW);
        let window = &data[window_start..];
        let mut found = None;
        for pos in 0..=window.len() - needle.len() {
            if &window[pos..pos + needle.len()] == needle {
                found = Some(window_start + pos);
            }
        }
        let at = found.ok_or(PdfError::NoValidXRef)?;

        let rest = &data[at + needle.len()..];
        let mut pos = 0;
        while pos < rest.len() && matches!(rest[pos], b' ' | b'\r' | b'\n') {
            pos += 1;
        }
        let digits_start = pos;
        while pos < rest.len() && rest[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start {
            return Err(PdfError::NoValidXRef);
        }
        std::str::from_utf8(&rest[digits_start..pos])
            .expect("digits are ascii")
            .parse()
            .map_err(|_| PdfError::NoValidXRef)
    }

    /// Follow the xref chain (`Prev`, hybrid `XRefStm`) with a cycle
    /// guard, newest section first.
    fn load_xref_chain(&mut self, start: usize) -> Result<()> {
        let mut visited = FxHashSet::default();
        let mut pos = start;

        while visited.insert(pos) {
            let table = self.load_xref_at(pos)?;
            let (prev, xref_stm) = xref::chain_pointers(&table.trailer);
            self.xrefs.push(table);

            if let Some(stm_pos) = xref_stm
                && visited.insert(stm_pos)
            {
                match self.load_xref_at(stm_pos) {
                    Ok(table) => self.xrefs.push(table),
                    Err(e) => tracing::warn!(pos = stm_pos, error = %e, "bad hybrid xref stream"),
                }
            }

            match prev {
                Some(prev_pos) => pos = prev_pos,
                None => break,
            }
        }
        Ok(())
    }

    /// Load the xref section at `pos`: classic table or xref stream.
    fn load_xref_at(&self, pos: usize) -> Result<XRefTable> {
        let data = self.data.as_ref();
        if pos >= data.len() {
            return Err(PdfError::OffsetOutOfBounds {
                offset: pos,
                limit: data.len(),
            });
        }
        if data[pos..].starts_with(b"xref") {
            return xref::parse_classic(data, pos);
        }

        let mut parser = ObjectParser::new(self.data.clone());
        let (_, _, obj) = parser.parse_indirect_at(pos)?;
        let stream = obj.as_stream().map_err(|_| {
            PdfError::malformed_at("expected an xref stream object", pos)
        })?;
        match stream.get("Type") {
            Some(PdfObject::Name(name)) if name == "XRef" => {}
            _ => return Err(PdfError::malformed_at("stream is not an xref stream", pos)),
        }
        let payload = self.decode_stream(stream)?;
        xref::parse_stream(&stream.dict, &payload)
    }

    /// Resolve an object by number, consulting the loaded tables in
    /// order. `Ok(None)` when no table knows the number.
    pub fn get_object(&self, number: u32) -> Result<Option<Rc<PdfObject>>> {
        if number == 0 {
            return Ok(None);
        }
        if let Some(obj) = self.cache.borrow_mut().get(number) {
            return Ok(Some(obj));
        }

        // Cycle guard across the recursive resolution paths (an object
        // stream whose container resolves through itself, etc.).
        if !self.resolving.borrow_mut().insert(number) {
            return Err(PdfError::malformed(format!(
                "circular resolution of object {number}"
            )));
        }
        let result = self.get_object_uncached(number);
        self.resolving.borrow_mut().remove(&number);

        let Some(obj) = result? else {
            return Ok(None);
        };
        let obj = Rc::new(obj);
        self.cache.borrow_mut().insert(number, Rc::clone(&obj));
        Ok(Some(obj))
    }

    fn get_object_uncached(&self, number: u32) -> Result<Option<PdfObject>> {
        for table in &self.xrefs {
            let Some(entry) = table.get(number) else {
                continue;
            };
            return match entry {
                XRefEntry::Offset { offset, .. } => {
                    let mut parser = ObjectParser::new(self.data.clone());
                    let (found, generation, obj) = parser.parse_indirect_at(offset)?;
                    if found != number {
                        return Err(PdfError::malformed_at(
                            format!("expected object {number}, found {found} {generation}"),
                            offset,
                        ));
                    }
                    Ok(Some(obj))
                }
                XRefEntry::InContainer { container } => {
                    let container = self.container(container)?;
                    match container.extract(number)? {
                        Some(obj) => Ok(Some(obj)),
                        None => Err(PdfError::malformed(format!(
                            "object {number} missing from its object stream"
                        ))),
                    }
                }
            };
        }
        Ok(None)
    }

    /// Fetch (and index, once per session) the compressed object
    /// container stored as object `number`.
    fn container(&self, number: u32) -> Result<Rc<ObjectStream>> {
        if let Some(container) = self.containers.borrow().get(&number) {
            return Ok(Rc::clone(container));
        }

        let obj = self.get_object(number)?.ok_or_else(|| {
            PdfError::malformed(format!("object stream {number} not cross-referenced"))
        })?;
        let stream = obj.as_stream().map_err(|_| {
            PdfError::malformed(format!("object {number} is not an object stream"))
        })?;
        let payload = self.decode_container_payload(stream)?;
        let container = Rc::new(ObjectStream::load(stream, payload)?);

        self.containers
            .borrow_mut()
            .insert(number, Rc::clone(&container));
        Ok(container)
    }

    /// Dereference indirect references until a direct object appears.
    /// A reference to a number no table knows is a semantic violation,
    /// not a grammar one.
    pub fn resolve(&self, obj: &PdfObject) -> Result<Rc<PdfObject>> {
        let mut visited = FxHashSet::default();
        let mut current = match obj {
            PdfObject::Ref(r) => {
                visited.insert(r.number);
                self.lookup(*r)?
            }
            other => return Ok(Rc::new(other.clone())),
        };
        while let PdfObject::Ref(r) = current.as_ref() {
            if !visited.insert(r.number) {
                return Err(PdfError::invalid(format!(
                    "circular reference chain through object {}",
                    r.number
                )));
            }
            current = self.lookup(*r)?;
        }
        Ok(current)
    }

    fn lookup(&self, r: ObjRef) -> Result<Rc<PdfObject>> {
        self.get_object(r.number)?.ok_or_else(|| {
            PdfError::invalid(format!("reference to missing object {r}"))
        })
    }

    /// Decode a stream's payload through its declared filter chain,
    /// honoring the LZW `EarlyChange` setting and undoing any PNG
    /// predictor named in `DecodeParms`.
    pub fn decode_stream(&self, stream: &StreamObject) -> Result<Vec<u8>> {
        let filters = stream.filters();
        let parms = self.decode_parms(stream)?;
        let early_change = parms
            .as_ref()
            .and_then(|p| p.get("EarlyChange"))
            .and_then(|e| e.as_int().ok())
            .unwrap_or(1)
            != 0;
        let mut payload =
            codec::decode_with_early_change(stream.raw_data(), &filters, early_change)?;

        if let Some(parms) = parms {
            let predictor = parms
                .get("Predictor")
                .and_then(|p| p.as_int().ok())
                .unwrap_or(1);
            if predictor >= 10 {
                let columns = parms
                    .get("Columns")
                    .and_then(|c| c.as_int().ok())
                    .unwrap_or(1) as usize;
                let colors = parms
                    .get("Colors")
                    .and_then(|c| c.as_int().ok())
                    .unwrap_or(1) as usize;
                let bits = parms
                    .get("BitsPerComponent")
                    .and_then(|b| b.as_int().ok())
                    .unwrap_or(8) as usize;
                payload = codec::apply_png_predictor(&payload, colors, bits, columns)?;
            }
        }

        Ok(payload)
    }

    /// Decode an object stream's payload. The container path guarantees
    /// FlateDecode only; anything else is unsupported by conviction, not
    /// accident.
    fn decode_container_payload(&self, stream: &StreamObject) -> Result<Vec<u8>> {
        let filters = stream.filters();
        match filters.as_slice() {
            [] => Ok(stream.raw_data().to_vec()),
            [only] if only == codec::FLATE => self.decode_stream(stream),
            other => Err(PdfError::Unsupported(format!(
                "object stream filtered with {}",
                other.join("+")
            ))),
        }
    }

    /// First DecodeParms dictionary, resolving an indirect reference or
    /// a one-element array form.
    fn decode_parms(&self, stream: &StreamObject) -> Result<Option<Dict>> {
        let Some(parms) = stream.get("DecodeParms").or_else(|| stream.get("DP")) else {
            return Ok(None);
        };
        let resolved = self.resolve(parms)?;
        Ok(match resolved.as_ref() {
            PdfObject::Dict(d) => Some(d.clone()),
            PdfObject::Array(arr) => match arr.first() {
                Some(PdfObject::Dict(d)) => Some(d.clone()),
                _ => None,
            },
            _ => None,
        })
    }
}
