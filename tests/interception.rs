//! Interception semantics: cancel, replace, passthrough.
//!
//! A cancelled packet forwards zero bytes downstream; an untouched packet
//! forwards byte-identical output; a replaced packet forwards the
//! replacement and nothing of the original. Fixtures drive the real
//! handshake/login sequence so the connection reaches the play phase the
//! way a live one would.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use packet_intercept::composite::{Composite, FoodProperties};
use packet_intercept::config::InterceptConfig;
use packet_intercept::pipeline::{
    Disposition, InjectionManager, ListenerPriority, PacketEvent, PacketListener,
};
use packet_intercept::protocol::ConnectionPhase;
use packet_intercept::transport::ProcessingChain;
use packet_intercept::version;
use packet_intercept::{CompressionKind, CompressionStage, PacketCursor, PacketRegistry};

const CONNECTION: u64 = 1;

/// Wraps a raw frame in bare wire framing, no tap, no stages.
fn framed(frame: &[u8]) -> Bytes {
    let mut bare = ProcessingChain::new(&InterceptConfig::default());
    bare.process_outgoing(frame).unwrap().unwrap()
}

fn intention_frame(ordinal: i32) -> Vec<u8> {
    let mut cursor = PacketCursor::new(version::UNKNOWN);
    cursor.write_var_int(0x00);
    cursor.write_var_int(ordinal);
    cursor.write_string("localhost");
    cursor.write_u16(25565);
    cursor.write_var_int(2);
    cursor.as_slice().to_vec()
}

/// Builds an attached (manager, chain) pair with the given listeners and
/// walks the connection through handshake and login to play at 1.20.
fn attached(listeners: Vec<Arc<dyn PacketListener>>) -> (InjectionManager, ProcessingChain) {
    let config = InterceptConfig::default();
    let manager = InjectionManager::with_standard_registry(config.clone()).unwrap();
    for listener in listeners {
        manager.listeners().register(listener).unwrap();
    }

    let mut chain = ProcessingChain::new(&config);
    manager.attach(CONNECTION, &mut chain).unwrap();

    // client handshake with login intent binds 1.20 and enters login
    chain
        .process_incoming(&framed(&intention_frame(763)))
        .unwrap();
    // login success pre-configuration goes straight to play
    chain.process_outgoing(&[0x02]).unwrap();
    (manager, chain)
}

/// A clientbound set-slot frame at 1.20 (opcode 0x14) carrying food
/// properties as its body for test purposes.
fn set_slot_frame(props: &FoodProperties) -> Vec<u8> {
    let mut cursor = PacketCursor::new(version::V1_20);
    cursor.write_var_int(0x14);
    props.write(&mut cursor).unwrap();
    cursor.as_slice().to_vec()
}

fn is_set_slot(event: &PacketEvent) -> bool {
    event.packet().packet_type().name == "set_slot"
}

struct CancelSetSlot;

impl PacketListener for CancelSetSlot {
    fn name(&self) -> &str {
        "cancel-set-slot"
    }

    fn on_packet_send(&self, event: &mut PacketEvent) {
        if is_set_slot(event) {
            event.cancel();
        }
    }
}

struct DoubleNutrition;

impl PacketListener for DoubleNutrition {
    fn name(&self) -> &str {
        "double-nutrition"
    }

    fn on_packet_send(&self, event: &mut PacketEvent) {
        if !is_set_slot(event) {
            return;
        }
        let mut props: FoodProperties = event.decode().unwrap();
        props.nutrition *= 2;
        event.replace(&props).unwrap();
    }
}

struct Observer;

impl PacketListener for Observer {
    fn name(&self) -> &str {
        "observer"
    }

    fn on_packet_send(&self, event: &mut PacketEvent) {
        if !is_set_slot(event) {
            return;
        }
        // reads must not count as mutation
        let _: FoodProperties = event.decode().unwrap();
        event.mark_handled();
    }
}

#[test]
fn untouched_packet_forwards_byte_identical() {
    let (_manager, mut chain) = attached(vec![Arc::new(Observer)]);

    let frame = set_slot_frame(&FoodProperties::new(4, 0.3, false));
    let wire = chain.process_outgoing(&frame).unwrap().unwrap();
    assert_eq!(wire, framed(&frame));
}

#[test]
fn cancelled_packet_forwards_zero_bytes() {
    let (_manager, mut chain) = attached(vec![Arc::new(CancelSetSlot)]);

    let frame = set_slot_frame(&FoodProperties::new(4, 0.3, false));
    assert_eq!(chain.process_outgoing(&frame).unwrap(), None);
}

#[test]
fn replaced_packet_forwards_the_replacement() {
    let (manager, mut chain) = attached(vec![Arc::new(DoubleNutrition)]);
    // a receiving chain with no tap, to unwrap the wire bytes
    let mut receiver = ProcessingChain::new(&InterceptConfig::default());

    let frame = set_slot_frame(&FoodProperties::new(4, 0.3, false));
    let wire = chain.process_outgoing(&frame).unwrap().unwrap();
    let delivered = receiver.process_incoming(&wire).unwrap();
    assert_eq!(delivered.len(), 1);

    let mut cursor = PacketCursor::wrap(BytesMut::from(&delivered[0][..]), version::V1_20);
    assert_eq!(cursor.read_var_int().unwrap(), 0x14);
    let decoded = FoodProperties::read(&mut cursor).unwrap();
    assert_eq!(decoded.nutrition, 8);

    manager.detach(CONNECTION, &mut chain).unwrap();
}

#[test]
fn cancellation_outranks_later_replacement() {
    struct LateReplacer;

    impl PacketListener for LateReplacer {
        fn name(&self) -> &str {
            "late-replacer"
        }

        fn priority(&self) -> ListenerPriority {
            ListenerPriority::Highest
        }

        fn on_packet_send(&self, event: &mut PacketEvent) {
            if !is_set_slot(event) {
                return;
            }
            // runs after the canceller; the cancellation must stick
            let props = FoodProperties::new(20, 20.0, true);
            event.replace(&props).unwrap();
        }
    }

    let (_manager, mut chain) = attached(vec![Arc::new(CancelSetSlot), Arc::new(LateReplacer)]);
    let frame = set_slot_frame(&FoodProperties::new(4, 0.3, false));
    assert_eq!(chain.process_outgoing(&frame).unwrap(), None);
}

#[test]
fn unknown_opcode_passes_through_inbound() {
    let (_manager, mut chain) = attached(vec![Arc::new(Observer)]);

    // 0x6e maps to nothing serverbound at 1.20
    let frame = [0x6eu8, 0xde, 0xad];
    let delivered = chain.process_incoming(&framed(&frame)).unwrap();
    assert_eq!(delivered, vec![Bytes::copy_from_slice(&frame)]);
}

#[test]
fn interception_survives_stage_toggles() {
    let (_manager, mut chain) = attached(vec![Arc::new(DoubleNutrition)]);
    let mut receiver = ProcessingChain::new(&InterceptConfig::default());

    let frame = set_slot_frame(&FoodProperties::new(2, 1.0, true));

    // plain
    let wire = chain.process_outgoing(&frame).unwrap().unwrap();
    assert_eq!(receiver.process_incoming(&wire).unwrap().len(), 1);

    // compression toggled on mid-connection
    let stage = CompressionStage {
        kind: CompressionKind::Lz4,
        threshold: 4,
    };
    chain.enable_compression(stage).unwrap();
    receiver.enable_compression(stage).unwrap();
    let wire = chain.process_outgoing(&frame).unwrap().unwrap();
    assert_eq!(receiver.process_incoming(&wire).unwrap().len(), 1);

    // and encryption on top
    let key = [5u8; 32];
    chain.enable_encryption(&key).unwrap();
    receiver.enable_encryption(&key).unwrap();
    let wire = chain.process_outgoing(&frame).unwrap().unwrap();
    let delivered = receiver.process_incoming(&wire).unwrap();
    assert_eq!(delivered.len(), 1);

    // the listener still saw and rewrote the packet under full wrapping
    let mut cursor = PacketCursor::wrap(BytesMut::from(&delivered[0][..]), version::V1_20);
    cursor.read_var_int().unwrap();
    assert_eq!(FoodProperties::read(&mut cursor).unwrap().nutrition, 4);
}

#[test]
fn disposition_surface_is_exact() {
    // direct interceptor-level check that Forward really is Forward and
    // not a re-encoded copy
    let config = Arc::new(InterceptConfig::default());
    let listeners = Arc::new(packet_intercept::ListenerChain::new());
    listeners.register(Arc::new(Observer)).unwrap();
    let mut tap = packet_intercept::Interceptor::new(
        9,
        PacketRegistry::standard().unwrap(),
        listeners,
        config,
    );
    tap.bind_version(version::V1_20);
    tap.set_phase(ConnectionPhase::Play);

    let frame = set_slot_frame(&FoodProperties::new(4, 0.3, false));
    assert_eq!(tap.process_outbound(&frame).unwrap(), Disposition::Forward);
}
