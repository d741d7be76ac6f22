//! # Packet Identity & Registry
//!
//! Version-independent packet identity and its resolution to per-version
//! wire opcodes.
//!
//! ## Components
//! - **Phase / Direction**: the partitioning every opcode lives under
//! - **PacketTypeId**: stable semantic identifiers
//! - **PacketRegistry**: O(1) opcode <-> type lookups per version
//! - **Packet**: a materialized packet for one interception cycle

pub mod packet;
pub mod packet_type;
pub mod phase;
pub mod registry;

pub use packet::Packet;
pub use packet_type::{types, PacketTypeId};
pub use phase::{ConnectionPhase, Direction};
pub use registry::{PacketRegistry, RegistryBuilder, VersionRange};
