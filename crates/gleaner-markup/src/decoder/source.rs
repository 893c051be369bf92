use std::io::{self, ErrorKind, Read};

const READ_CHUNK: usize = 8 * 1024;

/// Buffered byte reader with non-consuming lookahead.
///
/// Detection peeks at a window without consuming it, so the decoder later
/// sees the same bytes from the start of the stream.
#[derive(Debug)]
pub struct ByteSource<R> {
    reader: R,
    buffer: Vec<u8>,
    cursor: usize,
    exhausted: bool,
    consumed: u64,
}

impl<R: Read> ByteSource<R> {
    /// Wrap a reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            cursor: 0,
            exhausted: false,
            consumed: 0,
        }
    }

    /// Up to `len` unconsumed bytes. Shorter only at end of stream.
    ///
    /// # Errors
    ///
    /// Returns the reader's error. Interrupted reads are retried.
    pub fn lookahead(&mut self, len: usize) -> io::Result<&[u8]> {
        self.fill_to(len)?;
        let end = self.cursor.saturating_add(len).min(self.buffer.len());
        Ok(&self.buffer[self.cursor..end])
    }

    /// Consume one byte.
    ///
    /// # Errors
    ///
    /// Returns the reader's error.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        self.fill_to(1)?;
        let Some(&byte) = self.buffer.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        self.consumed += 1;
        Ok(Some(byte))
    }

    /// Consume up to `len` bytes already seen through [`Self::lookahead`].
    pub fn advance(&mut self, len: usize) {
        let len = len.min(self.buffer.len() - self.cursor);
        self.cursor += len;
        self.consumed += len as u64;
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.consumed
    }

    fn fill_to(&mut self, want: usize) -> io::Result<()> {
        while self.buffer.len() - self.cursor < want && !self.exhausted {
            self.compact();
            let start = self.buffer.len();
            self.buffer.resize(start + READ_CHUNK, 0);
            match self.reader.read(&mut self.buffer[start..]) {
                Ok(0) => {
                    self.buffer.truncate(start);
                    self.exhausted = true;
                }
                Ok(n) => self.buffer.truncate(start + n),
                Err(e) if e.kind() == ErrorKind::Interrupted => self.buffer.truncate(start),
                Err(e) => {
                    self.buffer.truncate(start);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn compact(&mut self) {
        if self.cursor == 0 || self.cursor < self.buffer.len() / 2 {
            return;
        }
        self.buffer.copy_within(self.cursor.., 0);
        let live = self.buffer.len() - self.cursor;
        self.buffer.truncate(live);
        self.cursor = 0;
    }
}
