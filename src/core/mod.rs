//! # Core Codec Components
//!
//! The version-abstraction codec: a single abstract type model that
//! serializes correctly across dozens of semantically-similar but
//! binary-incompatible protocol revisions.
//!
//! ## Components
//! - **Version**: totally-ordered table of protocol revisions
//! - **Cursor**: position-tracked buffer view all codecs go through
//! - **Primitive**: var-ints, numerics, strings, optionals, lists
//! - **Tag**: generic tagged tree for structured metadata
//! - **Composite**: per-entity codecs with version-range field layouts
//!
//! ## Security
//! - String and byte-array lengths are bounded per call site
//! - Tag trees are depth-limited
//! - Reads past the buffer end fail, never zero-fill

pub mod composite;
pub mod cursor;
pub mod primitive;
pub mod tag;
pub mod version;

pub use cursor::PacketCursor;
pub use version::ProtocolVersion;
