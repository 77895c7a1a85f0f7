//! Implementation-limit profile: every cross-referenced object stays
//! within the format's array and name limits.

use super::Profile;
use crate::document::Document;
use crate::model::{NAME_LIMIT, PdfObject};

#[derive(Debug, Default)]
pub struct LimitsProfile;

impl Profile for LimitsProfile {
    fn name(&self) -> &'static str {
        "Implementation limits"
    }

    fn satisfies(&self, doc: &Document) -> bool {
        document_within_limits(doc)
    }
}

/// Shared with the archival profile, which folds the same check in.
pub(crate) fn document_within_limits(doc: &Document) -> bool {
    doc.object_numbers().iter().all(|&number| {
        match doc.get_object(number) {
            Ok(Some(obj)) => object_within_limits(&obj),
            // A hole in the table is not a limit violation.
            Ok(None) => true,
            Err(_) => false,
        }
    })
}

/// Recursive limit check over one object tree. References are not
/// followed; their targets are cross-referenced and checked on their
/// own turn.
fn object_within_limits(obj: &PdfObject) -> bool {
    if !obj.within_limits() {
        return false;
    }
    match obj {
        PdfObject::Array(arr) => arr.iter().all(object_within_limits),
        PdfObject::Dict(dict) => dict
            .iter()
            .all(|(key, value)| key.len() <= NAME_LIMIT && object_within_limits(value)),
        PdfObject::Stream(stream) => stream
            .dict
            .iter()
            .all(|(key, value)| key.len() <= NAME_LIMIT && object_within_limits(value)),
        _ => true,
    }
}
