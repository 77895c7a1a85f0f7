//! Error types for the custos validation engine.
//!
//! The taxonomy follows the preservation-validation split: a *malformed*
//! document violates the base PDF grammar, an *invalid* one is
//! syntactically fine but breaks a semantic constraint. "Absent" is not
//! an error anywhere in this crate; lookups that can find nothing return
//! `Option`.

use crate::status::ValiditySink;
use thiserror::Error;

/// Primary error type for parsing and validation operations.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The bytes cannot be parsed as the object kind they claim to be.
    /// Fatal to well-formedness.
    #[error("malformed{}: {msg}", fmt_at(*.offset, .token))]
    Malformed {
        msg: String,
        offset: Option<usize>,
        token: Option<String>,
    },

    /// Grammar is fine but a format-defined semantic constraint fails.
    /// Fatal to validity only.
    #[error("invalid{}: {msg}", fmt_at(*.offset, .token))]
    Invalid {
        msg: String,
        offset: Option<usize>,
        token: Option<String>,
    },

    /// A recorded offset points past the end of the data it indexes.
    /// A specifically-labeled member of the malformed family.
    #[error("offset out of bounds: {offset} exceeds {limit}")]
    OffsetOutOfBounds { offset: usize, limit: usize },

    /// A construct the engine deliberately does not support (e.g. a
    /// filter outside the guaranteed set). Treated as malformed for the
    /// operation that needed it, but labeled distinctly in diagnostics.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A typed accessor was asked for the wrong interpretation.
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("no valid cross-reference table found")]
    NoValidXRef,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_at(offset: Option<usize>, token: &Option<String>) -> String {
    match (offset, token) {
        (Some(pos), Some(tok)) => format!(" at {pos} ({tok:?})"),
        (Some(pos), None) => format!(" at {pos}"),
        (None, Some(tok)) => format!(" ({tok:?})"),
        (None, None) => String::new(),
    }
}

impl PdfError {
    /// Malformation with no position information.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed {
            msg: msg.into(),
            offset: None,
            token: None,
        }
    }

    /// Malformation at a known byte offset.
    pub fn malformed_at(msg: impl Into<String>, offset: usize) -> Self {
        Self::Malformed {
            msg: msg.into(),
            offset: Some(offset),
            token: None,
        }
    }

    /// Malformation at a known byte offset, recording the offending token.
    pub fn malformed_token(msg: impl Into<String>, offset: usize, token: impl Into<String>) -> Self {
        Self::Malformed {
            msg: msg.into(),
            offset: Some(offset),
            token: Some(token.into()),
        }
    }

    /// Semantic violation with no position information.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid {
            msg: msg.into(),
            offset: None,
            token: None,
        }
    }

    /// Whether this error condemns well-formedness (as opposed to
    /// validity only).
    pub fn is_malformation(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. }
                | Self::OffsetOutOfBounds { .. }
                | Self::Unsupported(_)
                | Self::UnexpectedEof
                | Self::NoValidXRef
                | Self::Io(_)
        )
    }

    /// Downgrade the document's recorded state in `sink` according to
    /// this error's family: malformations clear the well-formed flag,
    /// semantic violations clear only the valid flag.
    pub fn disparage(&self, sink: &mut dyn ValiditySink) {
        if self.is_malformation() {
            sink.set_well_formed(false);
        } else {
            sink.set_valid(false);
        }
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
