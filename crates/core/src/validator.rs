//! Top-level validation entry point.

use crate::document::Document;
use crate::error::PdfError;
use crate::profile::{
    ArchivalLevelAProfile, ArchivalProfile, LimitsProfile, Profile, TaggedProfile,
};
use crate::status::ValidationStatus;
use bytes::Bytes;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::rc::Rc;

/// One profile's verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    pub name: String,
    pub satisfied: bool,
}

/// The outcome of validating one document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub profiles: Vec<ProfileResult>,
    /// Human-readable cause when the status was downgraded during
    /// parsing. Profile misses are not errors and are not recorded here.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a file on disk. A file that cannot be read at all is an
    /// I/O failure, not a verdict about the document, so it surfaces as
    /// `Err` instead of a malformed report.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> io::Result<ValidationReport> {
        match Document::open(path) {
            Err(PdfError::Io(e)) => Err(e),
            opened => Ok(self.report(opened)),
        }
    }

    pub fn validate_bytes(&self, data: Bytes) -> ValidationReport {
        self.report(Document::from_bytes(data))
    }

    pub fn validate_slice(&self, data: &[u8]) -> ValidationReport {
        self.report(Document::from_slice(data))
    }

    /// The default profile set. The level A profile shares the base
    /// archival instance so the base verdict is computed once.
    fn profiles() -> Vec<Box<dyn Profile>> {
        let archival = Rc::new(ArchivalProfile::new());
        vec![
            Box::new(LimitsProfile),
            Box::new(TaggedProfile),
            Box::new(ArchivalClone(Rc::clone(&archival))),
            Box::new(ArchivalLevelAProfile::with_base(archival)),
        ]
    }

    fn report(&self, opened: crate::error::Result<Document>) -> ValidationReport {
        let mut status = ValidationStatus::new();

        let doc = match opened {
            Ok(doc) => doc,
            Err(e) => {
                // A document that cannot be opened has a final answer:
                // the error family decides which flags fall, and no
                // profile is evaluated.
                e.disparage(&mut status);
                tracing::info!(error = %e, "document failed to open");
                return ValidationReport {
                    status,
                    profiles: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        // Grammar held, so semantic findings start here: a trailer that
        // names no catalog is a validity problem, not a parse failure.
        let mut error = None;
        if doc.catalog().is_none() {
            let e = PdfError::invalid("trailer names no document catalog");
            e.disparage(&mut status);
            error = Some(e.to_string());
        }

        // Profiles are independent of the status flags and of each
        // other; each one answers on its own.
        let profiles = Self::profiles()
            .iter()
            .map(|profile| {
                let satisfied = profile.satisfies(&doc);
                tracing::debug!(profile = profile.name(), satisfied, "profile evaluated");
                ProfileResult {
                    name: profile.name().to_string(),
                    satisfied,
                }
            })
            .collect();

        ValidationReport {
            status,
            profiles,
            error,
        }
    }
}

/// Adapter so one shared archival instance can sit in the boxed set and
/// feed the level A profile at the same time.
struct ArchivalClone(Rc<ArchivalProfile>);

impl Profile for ArchivalClone {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn satisfies(&self, doc: &Document) -> bool {
        self.0.satisfies(doc)
    }
}
