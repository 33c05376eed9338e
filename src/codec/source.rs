use std::io::{BufRead, ErrorKind, Read};

use super::error::DecodeError;
use crate::constants::STREAM_CHUNK_SIZE;

/// Byte input for the parser.
///
/// The parser only ever needs one byte of lookahead, so both in-memory
/// slices and buffered streams can drive it.
pub(crate) trait Source {
    /// Returns the next byte without consuming it, or `None` at end of input.
    fn peek(&mut self) -> Result<Option<u8>, DecodeError>;

    /// Consumes the byte returned by the last [`peek`](Self::peek).
    fn bump(&mut self);

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Bytes left in the input, when known up front.
    fn remaining(&self) -> Option<usize>;

    /// Reads exactly `len` payload bytes.
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError>;

    fn next_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek()?.ok_or(DecodeError::UnexpectedEof)?;
        self.bump();
        Ok(byte)
    }
}

pub(crate) struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl Source for SliceSource<'_> {
    fn peek(&mut self) -> Result<Option<u8>, DecodeError> {
        Ok(self.data.get(self.pos).copied())
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }

    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(DecodeError::LengthExceedsInput {
                declared: len,
                remaining,
            });
        }
        let payload = self.data[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(payload)
    }
}

pub(crate) struct ReaderSource<'r, R> {
    reader: &'r mut R,
    offset: usize,
}

impl<'r, R: BufRead> ReaderSource<'r, R> {
    pub(crate) fn new(reader: &'r mut R) -> Self {
        Self { reader, offset: 0 }
    }
}

impl<R: BufRead> Source for ReaderSource<'_, R> {
    fn peek(&mut self) -> Result<Option<u8>, DecodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn bump(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn remaining(&self) -> Option<usize> {
        None
    }

    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        // The declared length is untrusted: grow with the data actually read.
        let mut payload = Vec::with_capacity(len.min(STREAM_CHUNK_SIZE));
        let read = (&mut *self.reader)
            .take(len as u64)
            .read_to_end(&mut payload)?;
        self.offset += read;
        if read < len {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(payload)
    }
}
