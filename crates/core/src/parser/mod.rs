//! Tokenizer and object parser for the document grammar.

pub mod lexer;
pub mod object_parser;

pub use lexer::{Lexer, Token};
pub use object_parser::ObjectParser;
