//! # Packet Cursor
//!
//! Position-tracked, mutable view over a packet buffer, bound to one
//! resolved protocol version.
//!
//! All primitive and composite codecs read and write through this type.
//! The cursor supports mark/reset for speculative reads (peeking an opcode
//! before committing to a packet type) and re-decoding from the start.
//! Writing past the current capacity extends the buffer; reading past the
//! end is a decode failure, never a silent zero-fill.

use bytes::BytesMut;

use crate::core::version::ProtocolVersion;
use crate::error::{ProtocolError, Result};

/// Mutable byte-buffer view with an independent read/write position.
#[derive(Debug)]
pub struct PacketCursor {
    buf: BytesMut,
    pos: usize,
    mark: usize,
    version: ProtocolVersion,
}

impl PacketCursor {
    /// An empty cursor for encoding, bound to `version`.
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            buf: BytesMut::new(),
            pos: 0,
            mark: 0,
            version,
        }
    }

    /// Wraps an existing buffer for decoding, position at the start.
    pub fn wrap(buf: BytesMut, version: ProtocolVersion) -> Self {
        Self {
            buf,
            pos: 0,
            mark: 0,
            version,
        }
    }

    /// The protocol version every codec call through this cursor resolves
    /// field layouts against.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Rebinds the cursor to a different version. Used once per connection
    /// when the handshake reveals the negotiated version.
    pub fn bind_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Moves the position. Seeking past the end is rejected.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(ProtocolError::BufferUnderrun {
                needed: pos,
                remaining: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Records the current position for a later [`reset`](Self::reset).
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Returns to the most recently marked position (the start if none).
    pub fn reset(&mut self) {
        self.pos = self.mark;
    }

    /// Returns to the start of the buffer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Reads exactly `n` bytes, advancing the position.
    pub fn read_slice(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(ProtocolError::BufferUnderrun {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a fixed-size array, advancing the position.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_slice(1)?[0])
    }

    /// Reads one byte without advancing.
    pub fn peek_u8(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(ProtocolError::BufferUnderrun {
                needed: 1,
                remaining: 0,
            })
    }

    /// Writes bytes at the position, extending the buffer as needed.
    pub fn write_slice(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_slice(&[value]);
    }

    /// The full buffer, independent of the position.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the cursor, yielding the buffer.
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}
