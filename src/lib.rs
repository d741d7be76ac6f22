//! # packet-intercept
//!
//! Version-abstracted protocol codec and live packet interception pipeline
//! for hosting network applications.
//!
//! The crate lets a host observe and rewrite structured application-layer
//! packets flowing between two endpoints of a versioned binary protocol,
//! without owning the underlying transport. It solves two problems:
//!
//! 1. **A protocol codec** that serializes and deserializes dozens of
//!    semantically-similar but binary-incompatible protocol revisions
//!    through a single abstract type model — every composite declares its
//!    wire layout as a pure function of the bound
//!    [`ProtocolVersion`](core::version::ProtocolVersion), evaluated
//!    identically on encode and decode.
//! 2. **An interception pipeline** spliced into an already-running
//!    per-connection duplex stream, positioned correctly against the
//!    host's framing, compression, and encryption stages, with
//!    cancel/replace semantics that never lossily re-encode a packet
//!    nobody touched.
//!
//! ## Quick Tour
//!
//! ```
//! use std::sync::Arc;
//! use packet_intercept::config::InterceptConfig;
//! use packet_intercept::pipeline::{InjectionManager, PacketEvent, PacketListener};
//! use packet_intercept::transport::ProcessingChain;
//!
//! struct Dropper;
//!
//! impl PacketListener for Dropper {
//!     fn name(&self) -> &str {
//!         "dropper"
//!     }
//!
//!     fn on_packet_receive(&self, event: &mut PacketEvent) {
//!         if event.packet().packet_type().name == "chat_message" {
//!             event.cancel();
//!         }
//!     }
//! }
//!
//! # fn main() -> packet_intercept::error::Result<()> {
//! let config = InterceptConfig::default();
//! let manager = InjectionManager::with_standard_registry(config.clone())?;
//! manager.listeners().register(Arc::new(Dropper))?;
//!
//! let mut chain = ProcessingChain::new(&config);
//! manager.attach(1, &mut chain)?;
//! // feed chain.process_incoming / process_outgoing from the transport…
//! manager.detach(1, &mut chain)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Boundaries
//!
//! The host lifecycle surface is
//! [`attach`](pipeline::InjectionManager::attach),
//! [`detach`](pipeline::InjectionManager::detach), and
//! [`bind_version`](pipeline::InjectionManager::bind_version). Everything
//! else — transports, handshakes, per-packet convenience wrappers — stays
//! with the host.

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::core::composite;
pub use crate::core::cursor::PacketCursor;
pub use crate::core::version::{self, ProtocolVersion};
pub use config::InterceptConfig;
pub use error::{ProtocolError, Result};
pub use pipeline::{
    AttachState, Disposition, InjectionManager, Interceptor, ListenerChain, ListenerPriority,
    PacketEvent, PacketListener,
};
pub use protocol::{types, Packet, PacketRegistry, PacketTypeId};
pub use transport::{CompressionStage, ProcessingChain};
pub use utils::CompressionKind;
