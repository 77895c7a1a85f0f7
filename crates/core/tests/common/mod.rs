//! Document fixture builder shared across the integration tests.
//!
//! Offsets are recorded as material is appended, so the emitted
//! cross-reference section (classic table or xref stream) is exact by
//! construction.

// Not every test binary uses every helper.
#![allow(dead_code)]

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

#[derive(Clone, Copy)]
enum Entry {
    Offset(usize),
    InStream { container: u32 },
}

pub struct Builder {
    buf: Vec<u8>,
    entries: Vec<(u32, Entry)>,
    root: u32,
    trailer_extra: String,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            buf: b"%PDF-1.7\n".to_vec(),
            entries: Vec::new(),
            root: 1,
            trailer_extra: String::new(),
        }
    }

    pub fn root(mut self, number: u32) -> Self {
        self.root = number;
        self
    }

    /// Extra trailer entries, e.g. `" /ID [ (a) (a) ]"`.
    pub fn trailer_extra(mut self, extra: &str) -> Self {
        self.trailer_extra = extra.to_string();
        self
    }

    pub fn object(mut self, number: u32, body: &str) -> Self {
        self.entries.push((number, Entry::Offset(self.buf.len())));
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    pub fn stream(mut self, number: u32, dict: &str, payload: &[u8]) -> Self {
        self.entries.push((number, Entry::Offset(self.buf.len())));
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{dict}\nstream\n").as_bytes());
        self.buf.extend_from_slice(payload);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    /// A FlateDecode stream; pass `dict_open` without its closing `>>`.
    pub fn flate_stream(self, number: u32, dict_open: &str, payload: &[u8]) -> Self {
        let compressed = deflate(payload);
        let dict = format!(
            "{dict_open} /Filter /FlateDecode /Length {} >>",
            compressed.len()
        );
        self.stream(number, &dict, &compressed)
    }

    /// Register a type-2 entry without writing anything, for tests
    /// that build the container by hand.
    pub fn compressed(mut self, member: u32, container: u32) -> Self {
        self.entries.push((member, Entry::InStream { container }));
        self
    }

    /// An object stream holding `members` in order, flate-compressed.
    /// The members become type-2 cross-reference entries.
    pub fn object_stream(mut self, number: u32, members: &[(u32, &str)]) -> Self {
        let mut header = String::new();
        let mut bodies = String::new();
        for (member, body) in members {
            header.push_str(&format!("{member} {} ", bodies.len()));
            bodies.push_str(body);
            bodies.push(' ');
        }
        let first = header.len();
        let payload = format!("{header}{bodies}");

        for &(member, _) in members {
            self.entries.push((member, Entry::InStream { container: number }));
        }
        self.flate_stream(
            number,
            &format!(
                "<< /Type /ObjStm /N {} /First {first}",
                members.len()
            ),
            payload.as_bytes(),
        )
    }

    /// Finish with a classic xref table. Panics if any object lives in
    /// an object stream; classic tables cannot express those.
    pub fn finish(mut self) -> Vec<u8> {
        self.entries.sort_unstable_by_key(|&(n, _)| n);
        let max = self.entries.last().map_or(0, |&(n, _)| n);

        let xref_at = self.buf.len();
        self.buf
            .extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max {
            match self.entries.iter().find(|&&(n, _)| n == number) {
                Some(&(_, Entry::Offset(offset))) => self
                    .buf
                    .extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes()),
                Some(&(_, Entry::InStream { .. })) => {
                    panic!("object {number} needs an xref stream")
                }
                None => self.buf.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R{} >>\nstartxref\n{xref_at}\n%%EOF\n",
                max + 1,
                self.root,
                self.trailer_extra,
            )
            .as_bytes(),
        );
        self.buf
    }

    /// Finish with a PDF 1.5 xref stream (uncompressed payload,
    /// `W [1 4 2]`), which can also carry in-stream entries.
    pub fn finish_xref_stream(mut self) -> Vec<u8> {
        self.entries.sort_unstable_by_key(|&(n, _)| n);
        let max = self.entries.last().map_or(0, |&(n, _)| n);
        let xref_number = max + 1;
        let xref_at = self.buf.len();
        let size = xref_number + 1;

        let mut payload = Vec::new();
        push_entry(&mut payload, 0, 0, 65535); // object 0, free
        for number in 1..=xref_number {
            if number == xref_number {
                push_entry(&mut payload, 1, xref_at as u64, 0);
                continue;
            }
            match self.entries.iter().find(|&&(n, _)| n == number) {
                Some(&(_, Entry::Offset(offset))) => {
                    push_entry(&mut payload, 1, offset as u64, 0)
                }
                Some(&(_, Entry::InStream { container })) => {
                    push_entry(&mut payload, 2, u64::from(container), 0)
                }
                None => push_entry(&mut payload, 0, 0, 65535),
            }
        }

        let dict = format!(
            "<< /Type /XRef /Size {size} /W [ 1 4 2 ] /Root {} 0 R{} /Length {} >>",
            self.root,
            self.trailer_extra,
            payload.len(),
        );
        self.buf.extend_from_slice(
            format!("{xref_number} 0 obj\n{dict}\nstream\n").as_bytes(),
        );
        self.buf.extend_from_slice(&payload);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        self.buf
            .extend_from_slice(format!("startxref\n{xref_at}\n%%EOF\n").as_bytes());
        self.buf
    }
}

fn push_entry(payload: &mut Vec<u8>, kind: u8, field1: u64, field2: u16) {
    payload.push(kind);
    payload.extend_from_slice(&(field1 as u32).to_be_bytes());
    payload.extend_from_slice(&field2.to_be_bytes());
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory deflate");
    encoder.finish().expect("in-memory deflate")
}

/// Catalog plus an empty page tree, classic xref.
pub fn minimal() -> Vec<u8> {
    Builder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .finish()
}

/// A tagged document: MarkInfo, structure tree root, one P element.
pub fn tagged() -> Vec<u8> {
    Builder::new()
        .object(
            1,
            "<< /Type /Catalog /Pages 2 0 R /MarkInfo << /Marked true >> \
             /StructTreeRoot 3 0 R >>",
        )
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .object(3, "<< /Type /StructTreeRoot /K 4 0 R >>")
        .object(4, "<< /Type /StructElem /S /P /P 3 0 R >>")
        .finish()
}
