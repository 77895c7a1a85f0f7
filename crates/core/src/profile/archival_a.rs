//! Accessible archival profile (level A).

use super::Profile;
use super::archival::ArchivalProfile;
use super::structure::StructureTree;
use super::tagged::TaggedProfile;
use crate::document::Document;
use std::rc::Rc;

/// Level A layers tagging on top of the base archival profile: the
/// document must satisfy [`ArchivalProfile`], declare itself marked,
/// and carry a valid structure tree.
///
/// When the validation run also evaluates the base profile, share the
/// instance via [`with_base`](Self::with_base) so the base verdict is
/// reused rather than recomputed.
#[derive(Debug, Default)]
pub struct ArchivalLevelAProfile {
    base: Rc<ArchivalProfile>,
}

impl ArchivalLevelAProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: Rc<ArchivalProfile>) -> Self {
        Self { base }
    }
}

impl Profile for ArchivalLevelAProfile {
    fn name(&self) -> &'static str {
        "Archival, level A"
    }

    fn satisfies(&self, doc: &Document) -> bool {
        self.base.result(doc)
            && TaggedProfile::marked(doc)
            && StructureTree::new(doc).is_valid()
    }
}
