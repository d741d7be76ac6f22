//! # Transport Boundary
//!
//! The boundary with the host's transport: length framing, the stage
//! stack model the transform splices into, and the frame cipher backing
//! the encrypted stage.
//!
//! This crate does not own the transport — no sockets, no handshake. It
//! assumes a connection exists and decorates its frame path.

pub mod chain;
pub mod crypto;
pub mod frame;

pub use chain::{CompressionStage, ProcessingChain};
pub use crypto::FrameCipher;
pub use frame::FrameCodec;
