//! Byte-level tokenizer for the PDF object grammar.
//!
//! The lexer is stateless beyond its cursor: it turns a random-access
//! byte slice into a sequence of typed tokens, each tagged with the
//! offset where it began. The input is assumed adversarial; every
//! lexical failure carries that offset for diagnostics.

use crate::error::{PdfError, Result};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Boolean keyword
    Bool(bool),
    /// Name (e.g., /Type)
    Name(String),
    /// String (literal or hex form)
    String(Vec<u8>),
    /// Keyword or delimiter (e.g., obj, stream, R, <<, ])
    Keyword(Vec<u8>),
}

impl Token {
    /// Short printable rendering for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Real(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Name(s) => format!("/{s}"),
            Self::String(s) => String::from_utf8_lossy(s).into_owned(),
            Self::Keyword(kw) => String::from_utf8_lossy(kw).into_owned(),
        }
    }
}

/// Tokenizer over a byte slice.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position.
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Remaining unlexed bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// PDF whitespace class.
    pub fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
    }

    /// PDF delimiter class.
    pub fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    fn ends_token(b: u8) -> bool {
        Self::is_whitespace(b) || Self::is_delimiter(b)
    }

    /// Skip whitespace and `%` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) {
                self.advance();
            } else if b == b'%' {
                while let Some(c) = self.advance() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Lex a name after the `/`. `#xx` hex escapes decode to the named
    /// byte; a `#` without two hex digits is dropped and the following
    /// characters kept.
    fn lex_name(&mut self) -> Result<Token> {
        self.advance(); // '/'
        let mut name = Vec::new();

        while let Some(b) = self.peek() {
            if Self::ends_token(b) {
                break;
            }
            if b == b'#' {
                if let (Some(c1), Some(c2)) = (self.peek_at(1), self.peek_at(2))
                    && c1.is_ascii_hexdigit()
                    && c2.is_ascii_hexdigit()
                {
                    self.advance();
                    self.advance();
                    self.advance();
                    let byte = (hex_digit(c1) << 4) | hex_digit(c2);
                    name.push(byte);
                    continue;
                }
                self.advance();
            } else {
                self.advance();
                name.push(b);
            }
        }

        let name = String::from_utf8(name)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Ok(Token::Name(name))
    }

    /// Lex an integer or real.
    fn lex_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut has_dot = false;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.advance();
        }
        if self.peek() == Some(b'.') {
            has_dot = true;
            self.advance();
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.data[start..self.pos])
            .expect("number bytes are ascii")
            .to_string();

        if has_dot {
            let val: f64 = text
                .parse()
                .map_err(|_| PdfError::malformed_token("invalid real", start, &text))?;
            Ok(Token::Real(val))
        } else {
            let val: i64 = text
                .parse()
                .map_err(|_| PdfError::malformed_token("invalid integer", start, &text))?;
            Ok(Token::Int(val))
        }
    }

    /// Lex a `(...)` literal string with escapes and nesting.
    fn lex_literal_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // '('
        let mut result = Vec::new();
        let mut depth = 1usize;

        while depth > 0 {
            match self.advance() {
                Some(b'(') => {
                    depth += 1;
                    result.push(b'(');
                }
                Some(b')') => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                Some(b'\\') => match self.advance() {
                    Some(b'n') => result.push(b'\n'),
                    Some(b'r') => result.push(b'\r'),
                    Some(b't') => result.push(b'\t'),
                    Some(b'b') => result.push(0x08),
                    Some(b'f') => result.push(0x0c),
                    Some(b'(') => result.push(b'('),
                    Some(b')') => result.push(b')'),
                    Some(b'\\') => result.push(b'\\'),
                    Some(b'\r') => {
                        // Line continuation; swallow an optional \n too.
                        if self.peek() == Some(b'\n') {
                            self.advance();
                        }
                    }
                    Some(b'\n') => {}
                    Some(c) if (b'0'..b'8').contains(&c) => {
                        // Octal escape, up to three digits.
                        let mut octal = u32::from(c - b'0');
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d) if (b'0'..b'8').contains(&d) => {
                                    self.advance();
                                    octal = octal * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }
                        result.push((octal & 0xff) as u8);
                    }
                    Some(c) => result.push(c),
                    None => {
                        return Err(PdfError::malformed_at("unterminated string", start));
                    }
                },
                Some(c) => result.push(c),
                None => {
                    return Err(PdfError::malformed_at("unterminated string", start));
                }
            }
        }

        Ok(Token::String(result))
    }

    /// Lex a `<...>` hex string. Pairs decode to bytes; a trailing odd
    /// digit acts as if followed by `0`.
    fn lex_hex_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // '<'
        let mut digits = Vec::new();

        loop {
            match self.peek() {
                Some(b'>') => {
                    self.advance();
                    break;
                }
                Some(c) if c.is_ascii_hexdigit() => {
                    self.advance();
                    digits.push(c);
                }
                Some(c) if Self::is_whitespace(c) => {
                    self.advance();
                }
                Some(c) => {
                    return Err(PdfError::malformed_token(
                        "invalid character in hex string",
                        self.pos,
                        (c as char).to_string(),
                    ));
                }
                None => {
                    return Err(PdfError::malformed_at("unterminated hex string", start));
                }
            }
        }

        let mut result = Vec::with_capacity(digits.len().div_ceil(2));
        for pair in digits.chunks(2) {
            let byte = if pair.len() == 2 {
                (hex_digit(pair[0]) << 4) | hex_digit(pair[1])
            } else {
                hex_digit(pair[0]) << 4
            };
            result.push(byte);
        }

        Ok(Token::String(result))
    }

    /// Lex a bare keyword; `true`/`false` become boolean tokens.
    fn lex_keyword(&mut self) -> Result<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if Self::ends_token(b) {
                break;
            }
            self.advance();
        }
        let keyword = &self.data[start..self.pos];
        match keyword {
            b"true" => Ok(Token::Bool(true)),
            b"false" => Ok(Token::Bool(false)),
            _ => Ok(Token::Keyword(keyword.to_vec())),
        }
    }

    /// Next token and the offset where it began, or `None` at end of
    /// input.
    pub fn next_token(&mut self) -> Option<Result<(usize, Token)>> {
        self.skip_whitespace();
        if self.at_end() {
            return None;
        }

        let token_pos = self.pos;
        let b = self.peek()?;

        let result = match b {
            b'/' => self.lex_name(),
            b'(' => self.lex_literal_string(),
            b'<' => {
                if self.peek_at(1) == Some(b'<') {
                    self.advance();
                    self.advance();
                    Ok(Token::Keyword(b"<<".to_vec()))
                } else {
                    self.lex_hex_string()
                }
            }
            b'>' => {
                if self.peek_at(1) == Some(b'>') {
                    self.advance();
                    self.advance();
                    Ok(Token::Keyword(b">>".to_vec()))
                } else {
                    self.advance();
                    Err(PdfError::malformed_token("stray delimiter", token_pos, ">"))
                }
            }
            b'[' | b']' | b'{' | b'}' => {
                self.advance();
                Ok(Token::Keyword(vec![b]))
            }
            b')' => {
                self.advance();
                Err(PdfError::malformed_token("stray delimiter", token_pos, ")"))
            }
            b'+' | b'-' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit() || c == b'.') {
                    self.lex_number()
                } else {
                    self.lex_keyword()
                }
            }
            b'.' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
                    self.lex_number()
                } else {
                    self.lex_keyword()
                }
            }
            c if c.is_ascii_digit() => self.lex_number(),
            _ => self.lex_keyword(),
        };

        Some(result.map(|token| (token_pos, token)))
    }
}

fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
