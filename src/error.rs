//! # Error Types
//!
//! Comprehensive error handling for packet interception.
//!
//! This module defines all error variants that can occur while decoding,
//! dispatching, and re-encoding intercepted packets.
//!
//! ## Error Categories
//! - **Malformed Input**: buffer underruns, overlong var-ints, oversized
//!   strings, tag-tree violations. Fatal to the single packet being decoded,
//!   never to the connection.
//! - **Registry Errors**: opcode lookups outside a type's version range and
//!   build-time opcode conflicts.
//! - **Pipeline Errors**: listener failures and injection-state violations.
//! - **Stage Errors**: compression/encryption failures in the host chain
//!   model.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// ProtocolError is the primary error type for all interception operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("var-int exceeded {max_bytes} bytes without terminating")]
    MalformedVarInt { max_bytes: usize },

    #[error("string of {length} bytes exceeds ceiling of {max} bytes")]
    StringTooLong { length: usize, max: usize },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    #[error("tag tree exceeded maximum depth of {0}")]
    TagDepthExceeded(usize),

    #[error("unknown tag type id: {0}")]
    UnknownTagType(u8),

    #[error("tag list elements must share one type")]
    HeterogeneousTagList,

    #[error("unknown opcode 0x{opcode:02x}")]
    UnknownOpcode { opcode: i32 },

    #[error("packet processed before a protocol version was bound")]
    VersionNotBound,

    #[error("packet type {packet} has no opcode at version {version}")]
    OpcodeNotPresent {
        packet: &'static str,
        version: &'static str,
    },

    #[error("opcode 0x{opcode:02x} claimed by both {first} and {second} at version {version}")]
    RegistryConflict {
        opcode: i32,
        first: &'static str,
        second: &'static str,
        version: &'static str,
    },

    #[error("listener {listener} failed during dispatch")]
    ListenerFailure { listener: String },

    #[error("synchronization primitive poisoned")]
    LockPoisoned,

    #[error("connection {0} is not attached")]
    NotAttached(u64),

    #[error("interceptor used after detach")]
    Detached,

    #[error("frame of {0} bytes exceeds the maximum frame size")]
    OversizedFrame(usize),

    #[error("compression failed")]
    CompressionFailure,

    #[error("decompression failed")]
    DecompressionFailure,

    #[error("frame encryption failed")]
    EncryptionFailure,

    #[error("frame decryption failed")]
    DecryptionFailure,

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Whether this error is in the malformed-input class: fatal to the
    /// single packet being decoded, recoverable for the connection.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ProtocolError::BufferUnderrun { .. }
                | ProtocolError::MalformedVarInt { .. }
                | ProtocolError::StringTooLong { .. }
                | ProtocolError::InvalidUtf8
                | ProtocolError::NegativeLength(_)
                | ProtocolError::TagDepthExceeded(_)
                | ProtocolError::UnknownTagType(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
