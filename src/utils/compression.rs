//! Frame compression for the host chain's compressed stage.
//!
//! Supports LZ4 and Zstd. Decompression enforces a caller-supplied output
//! cap to prevent decompression bombs: the claimed size is validated
//! before any allocation for LZ4, and Zstd output is read in chunks
//! against the same limit.

use std::str::FromStr;

use crate::error::{ProtocolError, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionKind {
    Lz4,
    Zstd,
}

impl FromStr for CompressionKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lz4" => Ok(CompressionKind::Lz4),
            "zstd" => Ok(CompressionKind::Zstd),
            other => Err(ProtocolError::ConfigError(format!(
                "unknown compression kind: {other}"
            ))),
        }
    }
}

/// Compresses data using the specified compression algorithm.
///
/// # Errors
/// Returns `ProtocolError::CompressionFailure` if compression fails.
pub fn compress(data: &[u8], kind: CompressionKind) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            zstd::stream::copy_encode(data, &mut out, 1)
                .map_err(|_| ProtocolError::CompressionFailure)?;
            Ok(out)
        }
    }
}

/// Decompresses data that was compressed with the specified algorithm,
/// refusing any output larger than `max_out` bytes.
///
/// # Errors
/// Returns `ProtocolError::DecompressionFailure` if decompression fails or
/// the output would exceed `max_out`.
pub fn decompress(data: &[u8], kind: CompressionKind, max_out: usize) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Lz4 => {
            // validate the claimed size before lz4_flex attempts allocation;
            // the prepended size is a 4-byte little-endian integer
            if data.len() < 4 {
                return Err(ProtocolError::DecompressionFailure);
            }
            let claimed_size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if claimed_size > max_out {
                return Err(ProtocolError::DecompressionFailure);
            }

            let decompressed = lz4_flex::decompress_size_prepended(data)
                .map_err(|_| ProtocolError::DecompressionFailure)?;
            if decompressed.len() > max_out {
                return Err(ProtocolError::DecompressionFailure);
            }
            Ok(decompressed)
        }
        CompressionKind::Zstd => {
            let mut reader = zstd::stream::Decoder::new(data)
                .map_err(|_| ProtocolError::DecompressionFailure)?;

            // read in chunks to enforce the limit as output grows
            use std::io::Read;
            let mut out = Vec::new();
            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        out.extend_from_slice(&buffer[..n]);
                        if out.len() > max_out {
                            return Err(ProtocolError::DecompressionFailure);
                        }
                    }
                    Err(_) => return Err(ProtocolError::DecompressionFailure),
                }
            }
            Ok(out)
        }
    }
}
