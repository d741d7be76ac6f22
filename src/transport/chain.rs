//! # Processing Chain
//!
//! Model of a host connection's frame-processing stage stack, and the
//! splice point for the interception transform.
//!
//! Stage order on the wire, outermost first: length framing, then the
//! encryption stage, then the compression stage, then the packet payload.
//! Inbound bytes are deframed, opened, and decompressed before they reach
//! the spliced transform; outbound frames pass the transform *before* the
//! compression and encryption stages re-wrap them. That is exactly the
//! position the injection manager promises the transform.
//!
//! Hosts with their own stage stack only need to call the transform at the
//! equivalent point; this chain is the reference implementation and the
//! harness the integration tests drive.

use std::sync::{Arc, Mutex};

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::config::InterceptConfig;
use crate::core::cursor::PacketCursor;
use crate::core::version;
use crate::error::{ProtocolError, Result};
use crate::pipeline::interceptor::{Disposition, Interceptor};
use crate::transport::crypto::FrameCipher;
use crate::transport::frame::FrameCodec;
use crate::utils::compression::{compress, decompress, CompressionKind};

/// The host's compression stage: algorithm plus the size threshold below
/// which frames are passed through uncompressed.
#[derive(Debug, Clone, Copy)]
pub struct CompressionStage {
    pub kind: CompressionKind,
    pub threshold: usize,
}

/// One connection's stage stack with an optional spliced transform.
pub struct ProcessingChain {
    max_frame_bytes: usize,
    framer: FrameCodec,
    pending: BytesMut,
    compression: Option<CompressionStage>,
    cipher: Option<FrameCipher>,
    tap: Option<Arc<Mutex<Interceptor>>>,
}

impl ProcessingChain {
    pub fn new(config: &InterceptConfig) -> Self {
        let max_frame_bytes = config.limits.max_frame_bytes;
        Self {
            max_frame_bytes,
            framer: FrameCodec::new(max_frame_bytes),
            pending: BytesMut::new(),
            compression: None,
            cipher: None,
            tap: None,
        }
    }

    /// Inserts the interception transform at its splice point.
    pub fn splice(&mut self, tap: Arc<Mutex<Interceptor>>) {
        self.tap = Some(tap);
    }

    /// Removes the transform and flushes any buffered partial frame back
    /// to the caller so no data is lost.
    pub fn unsplice(&mut self) -> Option<Bytes> {
        self.tap = None;
        if self.pending.is_empty() {
            None
        } else {
            debug!(
                bytes = self.pending.len(),
                "flushing buffered partial frame on eject"
            );
            Some(self.pending.split().freeze())
        }
    }

    pub fn is_spliced(&self) -> bool {
        self.tap.is_some()
    }

    /// Host turned its compression stage on (mid-connection is fine).
    pub fn enable_compression(&mut self, stage: CompressionStage) -> Result<()> {
        self.compression = Some(stage);
        self.sync_tap_state(|tap| tap.set_compression(true))
    }

    pub fn disable_compression(&mut self) -> Result<()> {
        self.compression = None;
        self.sync_tap_state(|tap| tap.set_compression(false))
    }

    /// Host turned its encryption stage on (mid-connection is fine).
    pub fn enable_encryption(&mut self, key: &[u8; 32]) -> Result<()> {
        self.cipher = Some(FrameCipher::new(key));
        self.sync_tap_state(|tap| tap.set_encryption(true))
    }

    pub fn disable_encryption(&mut self) -> Result<()> {
        self.cipher = None;
        self.sync_tap_state(|tap| tap.set_encryption(false))
    }

    fn sync_tap_state(&self, update: impl FnOnce(&mut Interceptor)) -> Result<()> {
        if let Some(tap) = &self.tap {
            let mut tap = tap.lock().map_err(|_| ProtocolError::LockPoisoned)?;
            update(&mut tap);
        }
        Ok(())
    }

    /// Feeds raw inbound wire bytes through the stack. Returns the frames
    /// that survived interception, in order, ready for the host's own
    /// packet handling.
    pub fn process_incoming(&mut self, raw: &[u8]) -> Result<Vec<Bytes>> {
        self.pending.extend_from_slice(raw);

        let mut delivered = Vec::new();
        while let Some(wire_frame) = self.framer.decode(&mut self.pending)? {
            let mut payload = wire_frame;
            if let Some(cipher) = &mut self.cipher {
                payload = BytesMut::from(&cipher.open(&payload)?[..]);
            }
            if let Some(stage) = self.compression {
                payload = Self::decompress_stage(payload, stage.kind, self.max_frame_bytes)?;
            }

            let frame = payload.freeze();
            let disposition = match &self.tap {
                Some(tap) => tap
                    .lock()
                    .map_err(|_| ProtocolError::LockPoisoned)?
                    .process_inbound(&frame)?,
                None => Disposition::Forward,
            };
            match disposition {
                Disposition::Forward => delivered.push(frame),
                Disposition::Replace(replacement) => delivered.push(replacement),
                Disposition::Drop => {}
            }
        }
        Ok(delivered)
    }

    /// Runs one outbound frame through interception and re-wraps it for
    /// the wire. `None` means the frame was cancelled: zero bytes go out.
    pub fn process_outgoing(&mut self, frame: &[u8]) -> Result<Option<Bytes>> {
        let disposition = match &self.tap {
            Some(tap) => tap
                .lock()
                .map_err(|_| ProtocolError::LockPoisoned)?
                .process_outbound(frame)?,
            None => Disposition::Forward,
        };
        let payload = match disposition {
            Disposition::Forward => Bytes::copy_from_slice(frame),
            Disposition::Replace(replacement) => replacement,
            Disposition::Drop => return Ok(None),
        };

        let payload = match self.compression {
            Some(stage) => Self::compress_stage(&payload, stage)?,
            None => payload,
        };
        let payload = match &mut self.cipher {
            Some(cipher) => Bytes::from(cipher.seal(&payload)?),
            None => payload,
        };

        let mut wire = BytesMut::new();
        self.framer.encode(payload, &mut wire)?;
        Ok(Some(wire.freeze()))
    }

    /// Compressed-stage payload: var-int uncompressed size (zero for
    /// below-threshold passthrough), then the possibly-compressed body.
    fn compress_stage(payload: &[u8], stage: CompressionStage) -> Result<Bytes> {
        let mut out = PacketCursor::new(version::UNKNOWN);
        if payload.len() >= stage.threshold {
            out.write_var_int(payload.len() as i32);
            out.write_slice(&compress(payload, stage.kind)?);
        } else {
            out.write_var_int(0);
            out.write_slice(payload);
        }
        Ok(out.into_inner().freeze())
    }

    fn decompress_stage(
        payload: BytesMut,
        kind: CompressionKind,
        max_frame_bytes: usize,
    ) -> Result<BytesMut> {
        let mut cursor = PacketCursor::wrap(payload, version::UNKNOWN);
        let claimed = cursor.read_var_int()?;
        let body_offset = cursor.position();
        let mut buf = cursor.into_inner();
        let body = buf.split_off(body_offset);

        if claimed == 0 {
            return Ok(body);
        }
        if claimed < 0 {
            return Err(ProtocolError::NegativeLength(claimed));
        }
        if claimed as usize > max_frame_bytes {
            return Err(ProtocolError::OversizedFrame(claimed as usize));
        }
        let plain = decompress(&body, kind, max_frame_bytes)?;
        if plain.len() != claimed as usize {
            // a frame lying about its size is not forwarded
            return Err(ProtocolError::DecompressionFailure);
        }
        Ok(BytesMut::from(&plain[..]))
    }
}
