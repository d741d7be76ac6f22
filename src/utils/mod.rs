//! # Utility Modules
//!
//! Supporting utilities shared by the transport stages.
//!
//! ## Components
//! - **Compression**: LZ4 and Zstd with size limits
//!
//! ## Security
//! - Decompression bomb protection via caller-supplied output caps

pub mod compression;

pub use compression::CompressionKind;
