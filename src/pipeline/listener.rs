//! Listener surface.
//!
//! External code observes and rewrites packets by implementing
//! [`PacketListener`] and registering it with the chain. Listeners see a
//! [`PacketEvent`]: a read view of the semantic packet plus the mutation
//! verbs — cancel, replace, mark-handled.
//!
//! Cancellation is terminal within one dispatch: there is deliberately no
//! un-cancel, so a lower-priority listener cannot resurrect a packet a
//! higher-priority one killed.

use bytes::BytesMut;

use crate::core::composite::Composite;
use crate::error::Result;
use crate::protocol::packet::Packet;
use crate::protocol::phase::Direction;

/// Dispatch order. `Lowest` runs first and `Monitor` last, so monitors
/// observe the final state of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
    Monitor,
}

/// An observer of intercepted packets.
///
/// Implementations must be `Send + Sync`; one instance serves every
/// connection. A listener that returns `true` from
/// [`asynchronous`](Self::asynchronous) declares it tolerates deferred
/// invocation on a worker; forwarding order is still preserved by the
/// per-direction ordered queue.
pub trait PacketListener: Send + Sync {
    /// Name used in failure reports.
    fn name(&self) -> &str {
        "listener"
    }

    fn priority(&self) -> ListenerPriority {
        ListenerPriority::Normal
    }

    /// Whether this listener may be invoked from a worker task instead of
    /// the connection's own execution context.
    fn asynchronous(&self) -> bool {
        false
    }

    /// Called for client-to-server packets.
    fn on_packet_receive(&self, _event: &mut PacketEvent) {}

    /// Called for server-to-client packets.
    fn on_packet_send(&self, _event: &mut PacketEvent) {}
}

/// One packet offered to the listener chain.
///
/// The event owns the decoded [`Packet`] for the duration of the dispatch;
/// replacement installs a new owned body rather than mutating bytes a
/// listener may still be reading.
#[derive(Debug)]
pub struct PacketEvent {
    connection_id: u64,
    direction: Direction,
    packet: Packet,
    cancelled: bool,
    handled: bool,
    modified: bool,
}

impl PacketEvent {
    pub fn new(connection_id: u64, direction: Direction, packet: Packet) -> Self {
        Self {
            connection_id,
            direction,
            packet,
            cancelled: false,
            handled: false,
            modified: false,
        }
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Decodes the body as a composite value. Reading never marks the
    /// event modified.
    pub fn decode<T: Composite>(&mut self) -> Result<T> {
        self.packet.decode()
    }

    /// Replaces the body with the encoding of `value`. The frame will be
    /// re-encoded from this replacement instead of forwarding the original
    /// bytes.
    pub fn replace<T: Composite>(&mut self, value: &T) -> Result<()> {
        self.packet.encode(value)?;
        self.modified = true;
        Ok(())
    }

    /// Replaces the body with raw bytes.
    pub fn replace_body(&mut self, body: BytesMut) {
        let ty = self.packet.packet_type();
        let version = self.packet.version();
        self.packet = Packet::new(ty, version, body);
        self.modified = true;
    }

    /// Drops the packet: nothing is forwarded downstream. Terminal for
    /// this dispatch.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advisory flag for cooperating listeners; the pipeline itself
    /// ignores it.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn into_packet(self) -> Packet {
        self.packet
    }
}
