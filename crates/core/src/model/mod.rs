//! Document object model.

pub mod objects;

pub use objects::{ARRAY_LIMIT, Dict, NAME_LIMIT, ObjRef, PdfObject, StreamObject};
