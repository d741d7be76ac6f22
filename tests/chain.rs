//! Attach/eject lifecycle against a live stage stack.
//!
//! Splicing must survive compression/encryption toggles mid-connection,
//! ejection must flush buffered partial frames so no data is lost, and
//! attach/eject must be idempotent and race-free against concurrent
//! disconnect.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::thread;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use packet_intercept::config::InterceptConfig;
use packet_intercept::pipeline::InjectionManager;
use packet_intercept::transport::{FrameCodec, ProcessingChain};
use packet_intercept::{CompressionKind, CompressionStage};
use tokio_util::codec::Framed;

fn framed(frame: &[u8]) -> Bytes {
    let mut bare = ProcessingChain::new(&InterceptConfig::default());
    bare.process_outgoing(frame).unwrap().unwrap()
}

#[test]
fn eject_flushes_buffered_partial_frame() {
    let config = InterceptConfig::default();
    let manager = InjectionManager::with_standard_registry(config.clone()).unwrap();
    let mut chain = ProcessingChain::new(&config);
    manager.attach(1, &mut chain).unwrap();

    let wire = framed(&[0x42u8; 200]);
    let (head, tail) = wire.split_at(60);

    // a partial frame sits buffered when the host decides to eject
    assert!(chain.process_incoming(head).unwrap().is_empty());
    let flushed = manager.detach(1, &mut chain).unwrap().unwrap();
    assert_eq!(&flushed[..], head);

    // replaying flushed + remaining bytes down the normal path loses
    // nothing
    let mut replay = Vec::from(&flushed[..]);
    replay.extend_from_slice(tail);
    let delivered = chain.process_incoming(&replay).unwrap();
    assert_eq!(delivered, vec![Bytes::from(vec![0x42u8; 200])]);
}

#[test]
fn eject_with_no_buffer_flushes_nothing() {
    let config = InterceptConfig::default();
    let manager = InjectionManager::with_standard_registry(config.clone()).unwrap();
    let mut chain = ProcessingChain::new(&config);

    manager.attach(1, &mut chain).unwrap();
    assert!(manager.detach(1, &mut chain).unwrap().is_none());
}

#[test]
fn reattach_after_eject_works() {
    let config = InterceptConfig::default();
    let manager = InjectionManager::with_standard_registry(config.clone()).unwrap();
    let mut chain = ProcessingChain::new(&config);

    manager.attach(1, &mut chain).unwrap();
    manager.detach(1, &mut chain).unwrap();
    manager.attach(1, &mut chain).unwrap();
    assert!(manager.is_attached(1));
    assert!(chain.is_spliced());

    // the fresh interceptor starts over at handshake: traffic still flows
    let delivered = chain.process_incoming(&framed(&[0x00, 0x01])).unwrap();
    assert_eq!(delivered.len(), 1);
}

#[test]
fn concurrent_detach_races_are_safe() {
    let config = InterceptConfig::default();
    let manager = Arc::new(InjectionManager::with_standard_registry(config.clone()).unwrap());

    for round in 0..32u64 {
        let chain = Arc::new(Mutex::new(ProcessingChain::new(&config)));
        manager.attach(round, &mut chain.lock().unwrap()).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                let chain = chain.clone();
                thread::spawn(move || {
                    let mut chain = chain.lock().unwrap();
                    manager.detach(round, &mut chain).unwrap();
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }
        assert!(!manager.is_attached(round));
        assert!(!chain.lock().unwrap().is_spliced());
    }
}

#[test]
fn stage_toggles_mid_stream_do_not_break_framing() {
    let config = InterceptConfig::default();
    let manager = InjectionManager::with_standard_registry(config.clone()).unwrap();
    let mut sender = ProcessingChain::new(&config);
    let mut receiver = ProcessingChain::new(&config);
    manager.attach(1, &mut receiver).unwrap();

    let stage = CompressionStage {
        kind: CompressionKind::Zstd,
        threshold: 32,
    };
    let key = [11u8; 32];

    // plain -> compressed -> compressed+encrypted -> compressed only
    let phases: [(bool, bool); 4] = [(false, false), (true, false), (true, true), (true, false)];
    for (round, (compress, encrypt)) in phases.into_iter().enumerate() {
        if compress {
            sender.enable_compression(stage).unwrap();
            receiver.enable_compression(stage).unwrap();
        } else {
            sender.disable_compression().unwrap();
            receiver.disable_compression().unwrap();
        }
        if encrypt {
            sender.enable_encryption(&key).unwrap();
            receiver.enable_encryption(&key).unwrap();
        } else {
            sender.disable_encryption().unwrap();
            receiver.disable_encryption().unwrap();
        }

        let frame = vec![round as u8; 100];
        let wire = sender.process_outgoing(&frame).unwrap().unwrap();
        let delivered = receiver.process_incoming(&wire).unwrap();
        assert_eq!(delivered, vec![Bytes::from(frame)], "round {round}");
    }
}

#[tokio::test]
async fn frame_codec_drives_a_live_stream() {
    // the same codec the chain uses also works under tokio's Framed,
    // which is how hosts without their own framing drive it
    let (client, server) = tokio::io::duplex(1024);
    let mut client = Framed::new(client, FrameCodec::new(1 << 16));
    let mut server = Framed::new(server, FrameCodec::new(1 << 16));

    client
        .send(Bytes::from_static(b"one frame"))
        .await
        .unwrap();
    client.send(Bytes::from_static(b"and another")).await.unwrap();

    assert_eq!(
        server.next().await.unwrap().unwrap().as_ref(),
        b"one frame"
    );
    assert_eq!(
        server.next().await.unwrap().unwrap().as_ref(),
        b"and another"
    );
}
