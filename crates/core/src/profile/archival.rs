//! Base archival profile.

use super::Profile;
use super::limits::document_within_limits;
use crate::document::Document;
use std::cell::Cell;

/// Archival requirements on the document skeleton: no encryption, a
/// stable file identifier, an XMP metadata stream in the catalog, and
/// the implementation limits.
///
/// The answer is computed once and cached so derived profiles can reuse
/// it. The cache binds the instance to a single document; validation
/// runs build a fresh profile set per document.
#[derive(Debug, Default)]
pub struct ArchivalProfile {
    cached: Cell<Option<bool>>,
}

impl ArchivalProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached verdict, computing it on first call.
    pub fn result(&self, doc: &Document) -> bool {
        if let Some(cached) = self.cached.get() {
            return cached;
        }
        let verdict = self.evaluate(doc);
        self.cached.set(Some(verdict));
        verdict
    }

    fn evaluate(&self, doc: &Document) -> bool {
        let Some(trailer) = doc.trailer() else {
            return false;
        };
        if trailer.contains_key("Encrypt") {
            tracing::debug!(profile = self.name(), "document is encrypted");
            return false;
        }
        if !trailer.contains_key("ID") {
            return false;
        }

        let Some(catalog) = doc.catalog() else {
            return false;
        };
        let has_metadata = catalog
            .get("Metadata")
            .and_then(|m| doc.resolve(m).ok())
            .is_some_and(|m| m.as_stream().is_ok());
        if !has_metadata {
            return false;
        }

        document_within_limits(doc)
    }
}

impl Profile for ArchivalProfile {
    fn name(&self) -> &'static str {
        "Archival"
    }

    fn satisfies(&self, doc: &Document) -> bool {
        self.result(doc)
    }
}
