//! custos - a validation engine for PDF documents.
//!
//! The crate parses a document down to its object graph and reports two
//! document-level verdicts, well-formedness and validity, plus a set of
//! named conformance profiles. It never renders and never extracts
//! content; everything here exists to answer "is this file what it
//! claims to be".

pub mod codec;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;
pub mod profile;
pub mod status;
pub mod validator;

#[cfg(test)]
pub(crate) mod testpdf;

pub use document::Document;
pub use error::{PdfError, Result};
pub use model::{Dict, ObjRef, PdfObject, StreamObject};
pub use status::{ValidationStatus, ValiditySink};
pub use validator::{ProfileResult, ValidationReport, Validator};
