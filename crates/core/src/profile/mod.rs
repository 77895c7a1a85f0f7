//! Conformance profiles.
//!
//! A profile is a named predicate over a parsed document. Evaluation is
//! total: any parse or resolution trouble inside a profile means the
//! document is simply not in that profile, it never escalates to an
//! error. Profiles may build on one another; a derived profile reuses
//! the base profile's already-computed answer instead of re-walking the
//! document.
//!
//! Profile instances cache per-document work, so a fresh set is built
//! for every validation run.

pub mod archival;
pub mod archival_a;
pub mod limits;
pub mod structure;
pub mod tagged;

pub use archival::ArchivalProfile;
pub use archival_a::ArchivalLevelAProfile;
pub use limits::LimitsProfile;
pub use structure::{StructureTree, is_block_level_type, is_standard_structure_type};
pub use tagged::TaggedProfile;

use crate::document::Document;

pub trait Profile {
    /// Stable display name, as reported to callers.
    fn name(&self) -> &'static str;

    /// Whether the document is in this profile.
    fn satisfies(&self, doc: &Document) -> bool;
}
