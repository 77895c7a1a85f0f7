//! In-memory document fixtures for unit tests. Offsets are recorded
//! as objects are appended so the emitted xref table is always exact.
//! The integration tests carry a richer builder of the same shape.

pub struct Builder {
    buf: Vec<u8>,
    offsets: Vec<(u32, usize)>,
    root: u32,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            buf: b"%PDF-1.7\n".to_vec(),
            offsets: Vec::new(),
            root: 1,
        }
    }

    pub fn root(mut self, number: u32) -> Self {
        self.root = number;
        self
    }

    pub fn object(mut self, number: u32, body: &str) -> Self {
        self.offsets.push((number, self.buf.len()));
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.offsets.sort_unstable_by_key(|&(n, _)| n);
        let max = self.offsets.last().map_or(0, |&(n, _)| n);

        let xref_at = self.buf.len();
        self.buf
            .extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max {
            match self.offsets.iter().find(|&&(n, _)| n == number) {
                Some(&(_, offset)) => self
                    .buf
                    .extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes()),
                None => self.buf.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                max + 1,
                self.root,
            )
            .as_bytes(),
        );
        self.buf
    }
}

/// Catalog plus an empty page tree.
pub fn minimal() -> Vec<u8> {
    Builder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .finish()
}
