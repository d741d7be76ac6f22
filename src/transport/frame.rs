//! Var-int length framing.
//!
//! The outermost wire layer: every frame is a var-int byte count followed
//! by that many payload bytes. Implemented as a `tokio-util` codec so
//! hosts can drive it with `Framed` directly; the chain model also calls
//! `decode` synchronously on its own accumulation buffer.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::primitive::MAX_VAR_INT_BYTES;
use crate::error::{ProtocolError, Result};

/// Length-prefixed frame codec with an upper bound on frame size.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_bytes: usize,
}

impl FrameCodec {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }
}

fn put_var_int(dst: &mut BytesMut, value: i32) {
    let mut remaining = value as u32;
    loop {
        let byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining == 0 {
            dst.put_u8(byte);
            return;
        }
        dst.put_u8(byte | 0x80);
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>> {
        // parse the length header without committing to it
        let mut length: i32 = 0;
        let mut header_len = None;
        for i in 0..MAX_VAR_INT_BYTES {
            let Some(&byte) = src.get(i) else {
                return Ok(None);
            };
            length |= i32::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                header_len = Some(i + 1);
                break;
            }
        }
        let Some(header_len) = header_len else {
            return Err(ProtocolError::MalformedVarInt {
                max_bytes: MAX_VAR_INT_BYTES,
            });
        };

        if length < 0 {
            return Err(ProtocolError::NegativeLength(length));
        }
        let length = length as usize;
        if length > self.max_frame_bytes {
            return Err(ProtocolError::OversizedFrame(length));
        }
        if src.len() < header_len + length {
            src.reserve(header_len + length - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        Ok(Some(src.split_to(length)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_frame_bytes {
            return Err(ProtocolError::OversizedFrame(item.len()));
        }
        dst.reserve(item.len() + MAX_VAR_INT_BYTES);
        put_var_int(dst, item.len() as i32);
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut codec = FrameCodec::new(1 << 16);
        let mut wire = BytesMut::new();
        codec.encode(Bytes::from_static(b"hello"), &mut wire).unwrap();
        codec.encode(Bytes::from_static(b""), &mut wire).unwrap();

        assert_eq!(codec.decode(&mut wire).unwrap().unwrap().as_ref(), b"hello");
        assert_eq!(codec.decode(&mut wire).unwrap().unwrap().as_ref(), b"");
        assert_eq!(codec.decode(&mut wire).unwrap(), None);
    }

    #[test]
    fn partial_frame_waits_for_more() {
        let mut codec = FrameCodec::new(1 << 16);
        let mut wire = BytesMut::new();
        codec
            .encode(Bytes::from_static(b"split across reads"), &mut wire)
            .unwrap();

        let mut partial = wire.split_to(4);
        assert_eq!(codec.decode(&mut partial).unwrap(), None);
        partial.unsplit(wire);
        assert_eq!(
            codec.decode(&mut partial).unwrap().unwrap().as_ref(),
            b"split across reads"
        );
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut codec = FrameCodec::new(8);
        assert!(matches!(
            codec.encode(Bytes::from_static(b"123456789"), &mut BytesMut::new()),
            Err(ProtocolError::OversizedFrame(9))
        ));

        let mut wire = BytesMut::new();
        put_var_int(&mut wire, 1000);
        wire.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            codec.decode(&mut wire),
            Err(ProtocolError::OversizedFrame(1000))
        ));
    }
}
