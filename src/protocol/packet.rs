//! Materialized packets.
//!
//! A [`Packet`] owns its body bytes and a cursor over them, and is bound
//! to exactly one protocol version and one semantic type for its lifetime.
//! It exists for the duration of one interception cycle: decoded from a
//! frame, offered to listeners, then forwarded (possibly replaced) or
//! dropped.
//!
//! Replacement is an ownership transfer, never an aliased mutation: a
//! replacement body is a new owned buffer, so listener code still holding
//! views of the original cannot observe it changing underneath them.

use bytes::BytesMut;

use crate::core::composite::Composite;
use crate::core::cursor::PacketCursor;
use crate::core::version::ProtocolVersion;
use crate::error::Result;
use crate::protocol::packet_type::PacketTypeId;

/// One semantic packet: type id, bound version, and the body bytes that
/// follow the opcode on the wire.
#[derive(Debug)]
pub struct Packet {
    ty: &'static PacketTypeId,
    cursor: PacketCursor,
}

impl Packet {
    pub fn new(ty: &'static PacketTypeId, version: ProtocolVersion, body: BytesMut) -> Self {
        Self {
            ty,
            cursor: PacketCursor::wrap(body, version),
        }
    }

    pub fn packet_type(&self) -> &'static PacketTypeId {
        self.ty
    }

    pub fn version(&self) -> ProtocolVersion {
        self.cursor.version()
    }

    /// The body bytes, independent of the cursor position.
    pub fn body(&self) -> &[u8] {
        self.cursor.as_slice()
    }

    /// Cursor access for typed field reads. The position is wherever the
    /// previous reader left it; use [`rewind`](Self::rewind) to decode from
    /// the start.
    pub fn cursor(&mut self) -> &mut PacketCursor {
        &mut self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }

    /// Decodes a composite value from the start of the body.
    pub fn decode<T: Composite>(&mut self) -> Result<T> {
        self.cursor.rewind();
        T::read(&mut self.cursor)
    }

    /// Encodes a composite value as the entire body, replacing whatever
    /// was there. The new body is a fresh owned buffer.
    pub fn encode<T: Composite>(&mut self, value: &T) -> Result<()> {
        let mut cursor = PacketCursor::new(self.version());
        value.write(&mut cursor)?;
        self.cursor = cursor;
        Ok(())
    }

    pub fn into_body(self) -> BytesMut {
        self.cursor.into_inner()
    }
}
