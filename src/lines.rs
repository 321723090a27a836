//! Newline-delimited byte buffering.
//!
//! Both the peer frame stream and the SSE stream of the translation endpoint
//! are line protocols delivered in arbitrarily sized chunks. [`LineBuffer`]
//! accumulates raw bytes and hands out complete lines only, so a multi-byte
//! UTF-8 character split across two reads is reassembled before decoding.

use bytes::{Buf, BytesMut};

/// Accumulates bytes and yields complete `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of raw bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete line, without its delimiter.
    ///
    /// Returns `None` when no delimiter is buffered yet; the partial tail
    /// stays in the buffer until more bytes arrive.
    pub fn next_line(&mut self) -> Option<BytesMut> {
        let line_end = self.buffer.iter().position(|b| *b == b'\n')?;
        let line = self.buffer.split_to(line_end);
        self.buffer.advance(1);
        Some(line)
    }

    /// Number of bytes waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
