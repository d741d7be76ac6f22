//! Priority-ordered listener dispatch.
//!
//! Listeners are held sorted by priority and invoked in order. A listener
//! that panics is isolated: the panic is caught, reported with the
//! listener's name, and the remaining listeners still run against an
//! uncorrupted event. Listener failures are reported distinctly from codec
//! errors.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use tracing::{error, warn};

use crate::error::{ProtocolError, Result};
use crate::pipeline::listener::{PacketEvent, PacketListener};
use crate::protocol::phase::Direction;

/// The registered listeners, shared by every connection's interceptor.
pub struct ListenerChain {
    listeners: RwLock<Vec<Arc<dyn PacketListener>>>,
}

impl Default for ListenerChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerChain {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Registers a listener, keeping the chain sorted by priority.
    /// Registration order breaks ties, first registered first.
    pub fn register(&self, listener: Arc<dyn PacketListener>) -> Result<()> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| ProtocolError::LockPoisoned)?;
        let at = listeners.partition_point(|l| l.priority() <= listener.priority());
        listeners.insert(at, listener);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any registered listener tolerates deferred invocation.
    pub fn any_asynchronous(&self) -> Result<bool> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| ProtocolError::LockPoisoned)?;
        Ok(listeners.iter().any(|l| l.asynchronous()))
    }

    /// Runs the chain over one event. Every listener is invoked exactly
    /// once, cancelled event or not, so monitors always observe the final
    /// state; cancellation itself is sticky.
    pub fn dispatch(&self, event: &mut PacketEvent) -> Result<()> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| ProtocolError::LockPoisoned)?;

        for listener in listeners.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| match event.direction() {
                Direction::Serverbound => listener.on_packet_receive(event),
                Direction::Clientbound => listener.on_packet_send(event),
            }));
            if outcome.is_err() {
                // isolated per listener; the packet is neither dropped nor
                // corrupted by this failure
                let failure = ProtocolError::ListenerFailure {
                    listener: listener.name().to_string(),
                };
                error!(
                    error = %failure,
                    packet = %event.packet().packet_type(),
                    "listener panicked during dispatch"
                );
            }
        }

        if event.is_cancelled() {
            warn!(
                connection = event.connection_id(),
                packet = %event.packet().packet_type(),
                "packet cancelled by listener"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version;
    use crate::pipeline::listener::ListenerPriority;
    use crate::protocol::packet::Packet;
    use crate::protocol::packet_type::types;
    use bytes::BytesMut;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recording {
        order: Arc<RwLock<Vec<&'static str>>>,
        tag: &'static str,
        priority: ListenerPriority,
    }

    impl PacketListener for Recording {
        fn name(&self) -> &str {
            self.tag
        }

        fn priority(&self) -> ListenerPriority {
            self.priority
        }

        fn on_packet_send(&self, _event: &mut PacketEvent) {
            self.order.write().unwrap().push(self.tag);
        }
    }

    struct Panicking;

    impl PacketListener for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn priority(&self) -> ListenerPriority {
            ListenerPriority::Low
        }

        fn on_packet_send(&self, _event: &mut PacketEvent) {
            panic!("boom");
        }
    }

    struct Counting(AtomicUsize);

    impl PacketListener for Counting {
        fn priority(&self) -> ListenerPriority {
            ListenerPriority::Monitor
        }

        fn on_packet_send(&self, _event: &mut PacketEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn send_event() -> PacketEvent {
        PacketEvent::new(
            1,
            Direction::Clientbound,
            Packet::new(
                &types::play::server::KEEP_ALIVE,
                version::V1_20,
                BytesMut::from(&[0u8; 8][..]),
            ),
        )
    }

    #[test]
    fn priority_orders_dispatch() {
        let chain = ListenerChain::new();
        let order = Arc::new(RwLock::new(Vec::new()));
        for (tag, priority) in [
            ("monitor", ListenerPriority::Monitor),
            ("lowest", ListenerPriority::Lowest),
            ("high", ListenerPriority::High),
        ] {
            chain
                .register(Arc::new(Recording {
                    order: order.clone(),
                    tag,
                    priority,
                }))
                .unwrap();
        }

        let mut event = send_event();
        chain.dispatch(&mut event).unwrap();
        assert_eq!(*order.read().unwrap(), vec!["lowest", "high", "monitor"]);
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let chain = ListenerChain::new();
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        chain.register(Arc::new(Panicking)).unwrap();
        chain.register(counter.clone()).unwrap();

        let mut event = send_event();
        chain.dispatch(&mut event).unwrap();
        // the listener after the panic still ran, and the event survived
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(!event.is_cancelled());
        assert_eq!(event.packet().body(), &[0u8; 8]);
    }
}
