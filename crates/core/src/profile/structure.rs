//! Logical structure tree and the standard structure type vocabulary.

use crate::document::Document;
use crate::error::Result;
use crate::model::{Dict, PdfObject};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// The standard structure types. Membership is byte-exact and
/// case-sensitive; `Table` is standard, `table` is not.
pub const STANDARD_STRUCTURE_TYPES: [&str; 38] = [
    "Document",
    "Part",
    "Art",
    "Sect",
    "Div",
    "BlockQuote",
    "Caption",
    "TOC",
    "TOCI",
    "Index",
    "NonStruct",
    "Private",
    "P",
    "H",
    "H1",
    "H2",
    "H3",
    "H4",
    "H5",
    "H6",
    "L",
    "LI",
    "Lbl",
    "LBody",
    "Table",
    "TR",
    "TH",
    "TD",
    "Span",
    "Quote",
    "Note",
    "Reference",
    "BibEntry",
    "Code",
    "Link",
    "Figure",
    "Formula",
    "Form",
];

/// The block-level subset.
pub const BLOCK_LEVEL_TYPES: [&str; 13] = [
    "P", "H", "H1", "H2", "H3", "H4", "H5", "H6", "L", "LI", "Lbl", "LBody", "Table",
];

static STANDARD_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| STANDARD_STRUCTURE_TYPES.into_iter().collect());

static BLOCK_LEVEL_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| BLOCK_LEVEL_TYPES.into_iter().collect());

pub fn is_standard_structure_type(name: &str) -> bool {
    STANDARD_SET.contains(name)
}

pub fn is_block_level_type(name: &str) -> bool {
    BLOCK_LEVEL_SET.contains(name)
}

/// Keeps reference walks over hostile trees bounded.
const MAX_DEPTH: usize = 256;

/// The catalog's logical structure tree, evaluated once per call.
///
/// Presence and validity are separate questions: an untagged document
/// has no tree (absent, fine for most profiles), a tagged one must have
/// a tree whose every element carries a standard structure type or one
/// role-mapped to a standard type.
#[derive(Debug, Clone, Copy)]
pub struct StructureTree {
    present: bool,
    valid: bool,
}

impl StructureTree {
    pub fn new(doc: &Document) -> Self {
        let root = match find_root(doc) {
            Ok(Some(root)) => root,
            Ok(None) => {
                return Self {
                    present: false,
                    valid: false,
                };
            }
            Err(_) => {
                // A StructTreeRoot that cannot be resolved counts as
                // present (it was pointed at) but never as valid.
                return Self {
                    present: true,
                    valid: false,
                };
            }
        };

        let role_map = role_map(doc, &root);
        let valid = match root.get("K") {
            Some(kids) => {
                let mut visited = FxHashSet::default();
                walk_kids(doc, kids, &role_map, &mut visited, 0).unwrap_or(false)
            }
            // A rootless-but-empty tree carries no violations.
            None => true,
        };

        Self {
            present: true,
            valid,
        }
    }

    pub const fn is_present(&self) -> bool {
        self.present
    }

    pub const fn is_valid(&self) -> bool {
        self.present && self.valid
    }
}

fn find_root(doc: &Document) -> Result<Option<Dict>> {
    let Some(catalog) = doc.catalog() else {
        return Ok(None);
    };
    let Some(pointer) = catalog.get("StructTreeRoot") else {
        return Ok(None);
    };
    let root = doc.resolve(pointer)?;
    Ok(Some(root.as_dict()?.clone()))
}

fn role_map(doc: &Document, root: &Dict) -> Dict {
    root.get("RoleMap")
        .and_then(|rm| doc.resolve(rm).ok())
        .and_then(|rm| rm.as_dict().ok().cloned())
        .unwrap_or_default()
}

/// Follow the role map until a standard type or a dead end. The map may
/// chain (`/Chap -> /Head -> /H1`) and may contain loops.
fn maps_to_standard(name: &str, role_map: &Dict) -> bool {
    let mut current = name.to_string();
    let mut seen = FxHashSet::default();
    while seen.insert(current.clone()) {
        if is_standard_structure_type(&current) {
            return true;
        }
        match role_map.get(&current) {
            Some(PdfObject::Name(mapped)) => current = mapped.clone(),
            _ => return false,
        }
    }
    false
}

/// Walk one K value: a reference, a structure element dictionary, a
/// marked-content id, or an array of any of those.
fn walk_kids(
    doc: &Document,
    kids: &PdfObject,
    role_map: &Dict,
    visited: &mut FxHashSet<u32>,
    depth: usize,
) -> Result<bool> {
    if depth > MAX_DEPTH {
        return Ok(false);
    }
    match kids {
        PdfObject::Ref(r) => {
            if !visited.insert(r.number) {
                return Ok(false);
            }
            let target = doc.resolve(kids)?;
            walk_kids(doc, &target, role_map, visited, depth + 1)
        }
        PdfObject::Array(arr) => {
            for kid in arr {
                if !walk_kids(doc, kid, role_map, visited, depth + 1)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        PdfObject::Dict(dict) => walk_element(doc, dict, role_map, visited, depth),
        // A bare integer is a marked-content id leaf.
        PdfObject::Int(_) => Ok(true),
        _ => Ok(false),
    }
}

fn walk_element(
    doc: &Document,
    dict: &Dict,
    role_map: &Dict,
    visited: &mut FxHashSet<u32>,
    depth: usize,
) -> Result<bool> {
    // Content-item dictionaries are leaves, not structure elements.
    if let Some(PdfObject::Name(kind)) = dict.get("Type")
        && matches!(kind.as_str(), "MCR" | "OBJR")
    {
        return Ok(true);
    }

    let structure_type = match dict.get("S") {
        Some(s) => doc.resolve(s)?,
        None => return Ok(false),
    };
    let name = match structure_type.as_name() {
        Ok(name) => name,
        Err(_) => return Ok(false),
    };
    if !maps_to_standard(name, role_map) {
        return Ok(false);
    }

    match dict.get("K") {
        Some(kids) => walk_kids(doc, kids, role_map, visited, depth + 1),
        None => Ok(true),
    }
}
