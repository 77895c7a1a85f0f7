//! PDF object parser.
//!
//! Builds one object per call from the token stream, at arbitrary byte
//! offsets within the same session. The parser never resyncs: the first
//! unexpected token aborts the parse of the enclosing object with a
//! malformation carrying the token's offset.

use crate::error::{PdfError, Result};
use crate::model::{Dict, ObjRef, PdfObject, StreamObject};
use crate::parser::lexer::{Lexer, Token};
use bytes::Bytes;

/// Parser over a shared byte source.
///
/// Owns a zero-copy handle to the backing bytes so stream payloads can
/// be handed out as bounded windows without copying.
pub struct ObjectParser {
    data: Bytes,
    pos: usize,
    lookahead: Vec<(usize, Token)>,
}

impl ObjectParser {
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            pos: 0,
            lookahead: Vec::new(),
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Current cursor position.
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor, discarding any lookahead.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
        self.lookahead.clear();
    }

    /// Length of the backing source.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        if let Some(tok) = self.lookahead.pop() {
            return Ok(Some(tok));
        }
        let mut lexer = Lexer::new(self.data.as_ref());
        lexer.seek(self.pos);
        let result = lexer.next_token();
        self.pos = lexer.tell();
        match result {
            Some(Ok(tok)) => Ok(Some(tok)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn push_back(&mut self, tok: (usize, Token)) {
        self.lookahead.push(tok);
    }

    /// Parse one object at the cursor.
    pub fn parse_object(&mut self) -> Result<PdfObject> {
        let (pos, token) = self.next_token()?.ok_or(PdfError::UnexpectedEof)?;
        self.token_to_object(pos, token)
    }

    /// Seek to `offset` and parse one object there.
    pub fn parse_object_at(&mut self, offset: usize) -> Result<PdfObject> {
        if offset >= self.data.len() {
            return Err(PdfError::OffsetOutOfBounds {
                offset,
                limit: self.data.len(),
            });
        }
        self.seek(offset);
        self.parse_object()
    }

    fn token_to_object(&mut self, pos: usize, token: Token) -> Result<PdfObject> {
        match token {
            Token::Int(n) => {
                // Possible start of an indirect reference: num gen R.
                if n >= 0
                    && let Some(tok2) = self.next_token()?
                {
                    if let (pos2, Token::Int(g)) = tok2 {
                        if g >= 0
                            && let Some(tok3) = self.next_token()?
                        {
                            if matches!(&tok3.1, Token::Keyword(kw) if kw == b"R") {
                                return Ok(PdfObject::Ref(ObjRef::new(n as u32, g as u32)));
                            }
                            self.push_back(tok3);
                        }
                        self.push_back((pos2, Token::Int(g)));
                    } else {
                        self.push_back(tok2);
                    }
                }
                Ok(PdfObject::Int(n))
            }
            Token::Real(n) => Ok(PdfObject::Real(n)),
            Token::Bool(b) => Ok(PdfObject::Bool(b)),
            Token::Name(s) => Ok(PdfObject::Name(s)),
            Token::String(s) => Ok(PdfObject::String(s)),
            Token::Keyword(kw) => match kw.as_slice() {
                b"null" => Ok(PdfObject::Null),
                b"[" => self.parse_array(pos),
                b"<<" => self.parse_dict(pos),
                _ => Err(PdfError::malformed_token(
                    "unexpected keyword in object position",
                    pos,
                    String::from_utf8_lossy(&kw),
                )),
            },
        }
    }

    /// Parse array elements until the matching `]`.
    fn parse_array(&mut self, open_pos: usize) -> Result<PdfObject> {
        let mut arr = Vec::new();
        loop {
            let (pos, token) = self
                .next_token()?
                .ok_or_else(|| PdfError::malformed_at("unterminated array", open_pos))?;
            if matches!(&token, Token::Keyword(kw) if kw == b"]") {
                break;
            }
            arr.push(self.token_to_object(pos, token)?);
        }
        Ok(PdfObject::Array(arr))
    }

    /// Parse key/value pairs until the matching `>>`. Keys must be name
    /// tokens; anything else is a malformation.
    fn parse_dict(&mut self, open_pos: usize) -> Result<PdfObject> {
        let mut dict = Dict::new();
        loop {
            let (pos, token) = self
                .next_token()?
                .ok_or_else(|| PdfError::malformed_at("unterminated dictionary", open_pos))?;
            if matches!(&token, Token::Keyword(kw) if kw == b">>") {
                break;
            }
            let key = match token {
                Token::Name(name) => name,
                other => {
                    return Err(PdfError::malformed_token(
                        "expected name as dictionary key",
                        pos,
                        other.describe(),
                    ));
                }
            };
            let value = self.parse_object()?;
            dict.insert(key, value);
        }
        Ok(PdfObject::Dict(dict))
    }

    /// Parse the indirect object `num gen obj ... ` starting at `offset`.
    ///
    /// When the body is a dictionary immediately followed by the `stream`
    /// keyword, the result is a stream whose payload window is bounded by
    /// the declared `/Length`; a missing or indirect length falls back to
    /// scanning for `endstream`.
    pub fn parse_indirect_at(&mut self, offset: usize) -> Result<(u32, u32, PdfObject)> {
        if offset >= self.data.len() {
            return Err(PdfError::OffsetOutOfBounds {
                offset,
                limit: self.data.len(),
            });
        }
        self.seek(offset);

        let number = self.expect_uint("object number")?;
        let generation = self.expect_uint("generation number")?;
        match self.next_token()? {
            Some((_, Token::Keyword(kw))) if kw == b"obj" => {}
            Some((pos, other)) => {
                return Err(PdfError::malformed_token(
                    "expected 'obj' keyword",
                    pos,
                    other.describe(),
                ));
            }
            None => return Err(PdfError::UnexpectedEof),
        }

        let body = self.parse_object()?;

        if let PdfObject::Dict(dict) = body {
            if let Some(payload_start) = self.stream_payload_start() {
                let mut stream = self.frame_stream(dict, payload_start)?;
                stream.set_identity(number, generation);
                return Ok((number, generation, PdfObject::Stream(Box::new(stream))));
            }
            return Ok((number, generation, PdfObject::Dict(dict)));
        }

        Ok((number, generation, body))
    }

    fn expect_uint(&mut self, what: &str) -> Result<u32> {
        match self.next_token()? {
            Some((_, Token::Int(n))) if n >= 0 => Ok(n as u32),
            Some((pos, other)) => Err(PdfError::malformed_token(
                format!("expected {what}"),
                pos,
                other.describe(),
            )),
            None => Err(PdfError::UnexpectedEof),
        }
    }

    /// If the bytes at the cursor are the `stream` keyword, consume it
    /// and its end-of-line marker and return the payload start offset.
    fn stream_payload_start(&mut self) -> Option<usize> {
        let data = self.data.as_ref();
        let mut pos = self.pos;
        while pos < data.len() && Lexer::is_whitespace(data[pos]) {
            pos += 1;
        }
        if !data[pos..].starts_with(b"stream") {
            return None;
        }
        pos += 6;
        // The keyword is followed by CRLF or LF.
        if pos < data.len() && data[pos] == b'\r' {
            pos += 1;
        }
        if pos < data.len() && data[pos] == b'\n' {
            pos += 1;
        }
        self.seek(pos);
        Some(pos)
    }

    /// Bound the stream payload at `start` and build the stream object.
    fn frame_stream(&mut self, dict: Dict, start: usize) -> Result<StreamObject> {
        let data_len = self.data.len();

        let declared = dict
            .get("Length")
            .and_then(|obj| obj.as_int().ok())
            .filter(|&len| len >= 0)
            .map(|len| len as usize);

        let end = match declared {
            Some(len) if start + len <= data_len && self.endstream_follows(start + len) => {
                start + len
            }
            // Missing, indirect, or untrustworthy length: scan.
            _ => match find_endstream(&self.data.as_ref()[start..]) {
                Some(rel) => start + rel,
                None => {
                    return Err(PdfError::malformed_at(
                        "stream payload has no endstream",
                        start,
                    ));
                }
            },
        };

        self.seek(end);
        Ok(StreamObject::new(dict, self.data.slice(start..end), start))
    }

    /// Whether `endstream` follows at `pos`, allowing leading whitespace.
    fn endstream_follows(&self, pos: usize) -> bool {
        let data = self.data.as_ref();
        let mut cursor = pos;
        while cursor < data.len() && Lexer::is_whitespace(data[cursor]) {
            cursor += 1;
        }
        data[cursor..].starts_with(b"endstream")
    }
}

/// Locate `endstream` in `data`, returning the payload end with trailing
/// end-of-line bytes trimmed.
fn find_endstream(data: &[u8]) -> Option<usize> {
    let needle = b"endstream";
    if data.len() < needle.len() {
        return None;
    }
    for pos in 0..=data.len() - needle.len() {
        if &data[pos..pos + needle.len()] == needle {
            let mut end = pos;
            while end > 0 && matches!(data[end - 1], b' ' | b'\r' | b'\n') {
                end -= 1;
            }
            return Some(end);
        }
    }
    None
}
