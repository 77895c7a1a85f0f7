//! Tagged-document profile.

use super::Profile;
use super::structure::StructureTree;
use crate::document::Document;
use crate::model::PdfObject;

/// A tagged document declares itself via `MarkInfo /Marked true` in the
/// catalog and carries a valid logical structure tree. `Marked` must be
/// the boolean `true`; a name or string spelling "true" does not count.
#[derive(Debug, Default)]
pub struct TaggedProfile;

impl TaggedProfile {
    pub(crate) fn marked(doc: &Document) -> bool {
        let Some(catalog) = doc.catalog() else {
            return false;
        };
        let Some(mark_info) = catalog.get("MarkInfo") else {
            return false;
        };
        let Ok(mark_info) = doc.resolve(mark_info) else {
            return false;
        };
        let Ok(dict) = mark_info.as_dict() else {
            return false;
        };
        match dict.get("Marked").map(|m| doc.resolve(m)) {
            Some(Ok(marked)) => matches!(marked.as_ref(), PdfObject::Bool(true)),
            _ => false,
        }
    }
}

impl Profile for TaggedProfile {
    fn name(&self) -> &'static str {
        "Tagged document"
    }

    fn satisfies(&self, doc: &Document) -> bool {
        Self::marked(doc) && StructureTree::new(doc).is_valid()
    }
}
