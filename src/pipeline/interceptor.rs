//! # Interception Transform
//!
//! The per-connection duplex transform: decodes raw frames into semantic
//! packets, offers them to the listener chain, and re-encodes (or drops)
//! them before they continue down the host's processing chain.
//!
//! One interceptor serves exactly one connection. Inbound
//! (client-to-server) and outbound (server-to-client) frames take
//! symmetric paths through [`process_inbound`](Interceptor::process_inbound)
//! and [`process_outbound`](Interceptor::process_outbound); each direction
//! is driven by the host transport's own sequential execution context, and
//! neither path blocks on I/O.
//!
//! A connection starts with no version bound. Until the handshake reveals
//! the negotiated version, only handshake-phase packet types are decoded —
//! a deliberately version-agnostic best-effort path — and everything else
//! passes through untouched.

use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::InterceptConfig;
use crate::core::cursor::PacketCursor;
use crate::core::version::{self, ProtocolVersion};
use crate::error::{ProtocolError, Result};
use crate::pipeline::dispatcher::ListenerChain;
use crate::pipeline::listener::PacketEvent;
use crate::pipeline::ordered::OrderedForwarder;
use crate::protocol::packet::Packet;
use crate::protocol::packet_type::{types, PacketTypeId};
use crate::protocol::phase::{ConnectionPhase, Direction};
use crate::protocol::registry::PacketRegistry;

/// Where the transform currently sits relative to the host's stages.
/// Compression and encryption are toggled independently by the host
/// mid-connection; the reported state is the strongest wrapping in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    AttachedPlain,
    AttachedCompressed,
    AttachedEncrypted,
    Detached,
}

/// What the host should do with a processed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Forward the original bytes unchanged. No re-encode happened, so no
    /// accidental lossy re-serialization can have happened either.
    Forward,
    /// Forward these bytes instead of the original frame.
    Replace(Bytes),
    /// Forward nothing.
    Drop,
}

/// Per-connection duplex interception transform.
pub struct Interceptor {
    connection_id: u64,
    registry: Arc<PacketRegistry>,
    listeners: Arc<ListenerChain>,
    config: Arc<InterceptConfig>,
    version: ProtocolVersion,
    phase: ConnectionPhase,
    pending_intent: Option<i32>,
    compressed: bool,
    encrypted: bool,
    detached: bool,
}

impl Interceptor {
    pub fn new(
        connection_id: u64,
        registry: Arc<PacketRegistry>,
        listeners: Arc<ListenerChain>,
        config: Arc<InterceptConfig>,
    ) -> Self {
        Self {
            connection_id,
            registry,
            listeners,
            config,
            version: version::UNKNOWN,
            phase: ConnectionPhase::Handshake,
            pending_intent: None,
            compressed: false,
            encrypted: false,
            detached: false,
        }
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn state(&self) -> AttachState {
        if self.detached {
            AttachState::Detached
        } else if self.encrypted {
            AttachState::AttachedEncrypted
        } else if self.compressed {
            AttachState::AttachedCompressed
        } else {
            AttachState::AttachedPlain
        }
    }

    /// Binds the negotiated version. Called by the host glue once the
    /// handshake/login exchange has revealed it; the best-effort handshake
    /// decode below also binds it when the intention packet carries a known
    /// ordinal.
    pub fn bind_version(&mut self, version: ProtocolVersion) {
        debug!(connection = self.connection_id, %version, "version bound");
        self.version = version;
    }

    /// Advances the connection phase. The interceptor tracks the obvious
    /// transitions itself; hosts with exotic flows can override.
    pub fn set_phase(&mut self, phase: ConnectionPhase) {
        trace!(connection = self.connection_id, %phase, "phase change");
        self.phase = phase;
    }

    /// Host toggled its compression stage.
    pub fn set_compression(&mut self, enabled: bool) {
        self.compressed = enabled;
    }

    /// Host toggled its encryption stage.
    pub fn set_encryption(&mut self, enabled: bool) {
        self.encrypted = enabled;
    }

    /// Marks the transform ejected. Any later process call is an error,
    /// never silent passthrough.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Processes one client-to-server frame (opcode + body, already
    /// deframed, decrypted, and decompressed by earlier stages).
    pub fn process_inbound(&mut self, frame: &[u8]) -> Result<Disposition> {
        self.process(frame, Direction::Serverbound)
    }

    /// Processes one server-to-client frame, symmetrically.
    pub fn process_outbound(&mut self, frame: &[u8]) -> Result<Disposition> {
        self.process(frame, Direction::Clientbound)
    }

    fn process(&mut self, frame: &[u8], direction: Direction) -> Result<Disposition> {
        if self.detached {
            return Err(ProtocolError::Detached);
        }

        let mut cursor = PacketCursor::wrap(BytesMut::from(frame), self.version);
        let opcode = match cursor.read_var_int() {
            Ok(opcode) => opcode,
            Err(err) if err.is_malformed_input() => {
                // fatal to this packet only; the connection lives on
                warn!(
                    connection = self.connection_id,
                    %direction,
                    error = %err,
                    "dropping malformed frame"
                );
                return Ok(Disposition::Drop);
            }
            Err(err) => return Err(err),
        };

        let resolved = if self.version.is_unknown() {
            // the limited handshake-only decode path: before a version is
            // bound, nothing else is decodable
            if self.phase == ConnectionPhase::Handshake
                && direction == Direction::Serverbound
                && opcode == 0x00
            {
                Some(&types::handshake::client::INTENTION)
            } else {
                trace!(
                    connection = self.connection_id,
                    opcode,
                    "version not bound, passing frame through"
                );
                return Ok(Disposition::Forward);
            }
        } else {
            match self
                .registry
                .resolve(self.phase, direction, self.version, opcode)
            {
                Ok(ty) => Some(ty),
                Err(err @ ProtocolError::UnknownOpcode { .. }) => {
                    // protocol extensions the registry doesn't know about
                    // must not break the connection
                    debug!(
                        connection = self.connection_id,
                        %direction,
                        phase = %self.phase,
                        error = %err,
                        "passing unresolvable frame through"
                    );
                    None
                }
                Err(err) => return Err(err),
            }
        };

        let Some(ty) = resolved else {
            return Ok(Disposition::Forward);
        };

        let body_offset = cursor.position();
        let mut body = cursor.into_inner();
        let body = body.split_off(body_offset);

        if ty == &types::handshake::client::INTENTION {
            self.observe_intention(&body);
        }

        let packet = Packet::new(ty, self.version, body);
        let mut event = PacketEvent::new(self.connection_id, direction, packet);
        self.listeners.dispatch(&mut event)?;
        let disposition = finish_event(event, opcode, self.version);

        if disposition != Disposition::Drop {
            self.track_phase(ty, direction);
        }
        Ok(disposition)
    }

    /// Deferred variant of the inbound path for chains with
    /// asynchronous-tolerant listeners: the frame's forwarding slot is
    /// reserved immediately, listener work runs on a worker task, and the
    /// queue forwards results strictly in submission order.
    pub fn process_inbound_deferred(
        &mut self,
        frame: Bytes,
        queue: &OrderedForwarder,
    ) -> Result<()> {
        self.process_deferred(frame, Direction::Serverbound, queue)
    }

    /// Deferred variant of the outbound path.
    pub fn process_outbound_deferred(
        &mut self,
        frame: Bytes,
        queue: &OrderedForwarder,
    ) -> Result<()> {
        self.process_deferred(frame, Direction::Clientbound, queue)
    }

    fn process_deferred(
        &mut self,
        frame: Bytes,
        direction: Direction,
        queue: &OrderedForwarder,
    ) -> Result<()> {
        if self.detached {
            return Err(ProtocolError::Detached);
        }

        // phase-control traffic (and anything before play) stays on the
        // synchronous path: its phase transitions must apply before the
        // next frame is resolved
        if self.phase != ConnectionPhase::Play || !self.listeners.any_asynchronous()? {
            let disposition = self.process(&frame, direction)?;
            queue.submit(frame).complete(disposition);
            return Ok(());
        }

        let mut cursor = PacketCursor::wrap(BytesMut::from(&frame[..]), self.version);
        let Ok(opcode) = cursor.read_var_int() else {
            warn!(
                connection = self.connection_id,
                %direction,
                "dropping malformed frame"
            );
            queue.submit(frame).complete(Disposition::Drop);
            return Ok(());
        };
        let Some(ty) = self
            .registry
            .type_for(self.phase, direction, self.version, opcode)
        else {
            debug!(
                connection = self.connection_id,
                %direction,
                opcode,
                "unknown opcode, passing frame through"
            );
            queue.submit(frame).complete(Disposition::Forward);
            return Ok(());
        };

        let body_offset = cursor.position();
        let mut buf = cursor.into_inner();
        let body = buf.split_off(body_offset);
        let packet = Packet::new(ty, self.version, body);

        let handle = queue.submit(frame);
        let listeners = self.listeners.clone();
        let connection_id = self.connection_id;
        let version = self.version;
        tokio::spawn(async move {
            let mut event = PacketEvent::new(connection_id, direction, packet);
            if listeners.dispatch(&mut event).is_err() {
                // forwarding the original is always the safe answer
                handle.complete(Disposition::Forward);
                return;
            }
            handle.complete(finish_event(event, opcode, version));
        });
        Ok(())
    }

    /// Best-effort decode of the intention packet: protocol ordinal,
    /// address, port, requested next phase. Works without a bound version
    /// by construction, since this packet's shape predates every revision
    /// in the table.
    fn observe_intention(&mut self, body: &[u8]) {
        let mut cursor = PacketCursor::wrap(BytesMut::from(body), self.version);
        let parsed = (|| -> Result<(i32, i32)> {
            let ordinal = cursor.read_var_int()?;
            let _address = cursor.read_string(self.config.limits.max_string_bytes)?;
            let _port = cursor.read_u16()?;
            let intent = cursor.read_var_int()?;
            Ok((ordinal, intent))
        })();

        match parsed {
            Ok((ordinal, intent)) => {
                match ProtocolVersion::from_ordinal(ordinal) {
                    Some(v) => self.bind_version(v),
                    None => debug!(
                        connection = self.connection_id,
                        ordinal, "handshake carried unregistered protocol ordinal"
                    ),
                }
                self.pending_intent = Some(intent);
            }
            Err(err) => {
                debug!(
                    connection = self.connection_id,
                    error = %err,
                    "handshake intention not decodable, leaving version unbound"
                );
            }
        }
    }

    /// Phase transitions observable from forwarded traffic.
    fn track_phase(&mut self, ty: &'static PacketTypeId, direction: Direction) {
        match (self.phase, direction) {
            (ConnectionPhase::Handshake, Direction::Serverbound) => {
                if ty == &types::handshake::client::INTENTION {
                    let next = match self.pending_intent.take() {
                        Some(1) => ConnectionPhase::Status,
                        _ => ConnectionPhase::Login,
                    };
                    self.set_phase(next);
                }
            }
            (ConnectionPhase::Login, Direction::Serverbound) => {
                if ty == &types::login::client::LOGIN_ACKNOWLEDGED {
                    self.set_phase(ConnectionPhase::Configuration);
                }
            }
            (ConnectionPhase::Login, Direction::Clientbound) => {
                if ty == &types::login::server::LOGIN_FINISHED
                    && self.version.is_older_than(version::V1_20_2)
                {
                    // before the configuration phase existed, login success
                    // went straight to play
                    self.set_phase(ConnectionPhase::Play);
                }
            }
            (ConnectionPhase::Configuration, Direction::Serverbound) => {
                if ty == &types::configuration::client::FINISH_CONFIGURATION {
                    self.set_phase(ConnectionPhase::Play);
                }
            }
            _ => {}
        }
    }
}

/// Turns a dispatched event into the frame disposition: cancellation wins,
/// a modified body is re-encoded behind the original opcode, and an
/// untouched packet forwards the original bytes.
fn finish_event(event: PacketEvent, opcode: i32, version: ProtocolVersion) -> Disposition {
    if event.is_cancelled() {
        Disposition::Drop
    } else if event.is_modified() {
        let mut out = PacketCursor::new(version);
        out.write_var_int(opcode);
        out.write_slice(event.into_packet().body());
        Disposition::Replace(out.into_inner().freeze())
    } else {
        Disposition::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::listener::PacketListener;

    fn interceptor(listeners: Arc<ListenerChain>) -> Interceptor {
        Interceptor::new(
            1,
            PacketRegistry::standard().unwrap(),
            listeners,
            Arc::new(InterceptConfig::default()),
        )
    }

    fn intention_frame(ordinal: i32, intent: i32) -> BytesMut {
        let mut c = PacketCursor::new(version::UNKNOWN);
        c.write_var_int(0x00);
        c.write_var_int(ordinal);
        c.write_string("localhost");
        c.write_u16(25565);
        c.write_var_int(intent);
        c.into_inner()
    }

    struct Cancelling;

    impl PacketListener for Cancelling {
        fn on_packet_receive(&self, event: &mut PacketEvent) {
            event.cancel();
        }
    }

    #[test]
    fn handshake_binds_version_and_advances_phase() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        assert!(tap.version().is_unknown());

        let disposition = tap.process_inbound(&intention_frame(767, 2)).unwrap();
        assert_eq!(disposition, Disposition::Forward);
        assert_eq!(tap.version(), version::V1_21);
        assert_eq!(tap.phase(), ConnectionPhase::Login);
    }

    #[test]
    fn handshake_with_status_intent() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.process_inbound(&intention_frame(768, 1)).unwrap();
        assert_eq!(tap.phase(), ConnectionPhase::Status);
        assert_eq!(tap.version(), version::V1_21_2);
    }

    #[test]
    fn unregistered_ordinal_leaves_version_unbound() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.process_inbound(&intention_frame(9999, 2)).unwrap();
        assert!(tap.version().is_unknown());
        // phase still advances so later frames pass through, not misparse
        assert_eq!(tap.phase(), ConnectionPhase::Login);
    }

    #[test]
    fn pre_bind_non_handshake_frames_pass_through() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.set_phase(ConnectionPhase::Play);
        let disposition = tap.process_inbound(&[0x12, 1, 2, 3]).unwrap();
        assert_eq!(disposition, Disposition::Forward);
    }

    #[test]
    fn unknown_opcode_passes_through() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.bind_version(version::V1_20);
        tap.set_phase(ConnectionPhase::Play);
        let disposition = tap.process_inbound(&[0x7e, 0xaa]).unwrap();
        assert_eq!(disposition, Disposition::Forward);
    }

    #[test]
    fn malformed_opcode_drops_packet() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.bind_version(version::V1_20);
        tap.set_phase(ConnectionPhase::Play);
        let disposition = tap
            .process_inbound(&[0x80, 0x80, 0x80, 0x80, 0x80])
            .unwrap();
        assert_eq!(disposition, Disposition::Drop);
    }

    #[test]
    fn cancelled_packet_is_dropped() {
        let listeners = Arc::new(ListenerChain::new());
        listeners.register(Arc::new(Cancelling)).unwrap();
        let mut tap = interceptor(listeners);
        tap.bind_version(version::V1_20);
        tap.set_phase(ConnectionPhase::Play);

        // serverbound keep-alive at 1.20 is 0x12
        let mut frame = PacketCursor::new(version::V1_20);
        frame.write_var_int(0x12);
        frame.write_i64(42);
        let disposition = tap.process_inbound(frame.as_slice()).unwrap();
        assert_eq!(disposition, Disposition::Drop);
    }

    #[test]
    fn detached_interceptor_rejects_frames() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        tap.detach();
        assert_eq!(tap.state(), AttachState::Detached);
        assert!(matches!(
            tap.process_inbound(&[0x00]),
            Err(ProtocolError::Detached)
        ));
    }

    #[test]
    fn state_reports_strongest_wrapping() {
        let mut tap = interceptor(Arc::new(ListenerChain::new()));
        assert_eq!(tap.state(), AttachState::AttachedPlain);
        tap.set_compression(true);
        assert_eq!(tap.state(), AttachState::AttachedCompressed);
        tap.set_encryption(true);
        assert_eq!(tap.state(), AttachState::AttachedEncrypted);
        tap.set_encryption(false);
        assert_eq!(tap.state(), AttachState::AttachedCompressed);
        tap.set_compression(false);
        assert_eq!(tap.state(), AttachState::AttachedPlain);
    }
}
