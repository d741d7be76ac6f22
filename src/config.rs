//! # Configuration Management
//!
//! Centralized configuration for the interception library.
//!
//! This module provides structured configuration for codec limits, the
//! host chain's compression stage, and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment-variable overrides via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - Frame and string ceilings bound memory use against malicious input
//! - The default compression threshold (256 bytes) balances wire size and
//!   CPU

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{ProtocolError, Result};
use crate::utils::compression::CompressionKind;

/// Default ceiling for a single frame, the 3-byte var-int maximum.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 2_097_151;

/// Default ceiling for length-prefixed strings.
pub const DEFAULT_MAX_STRING_BYTES: usize = 32_767;

/// Default compression threshold for the host chain's compressed stage.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 256;

/// Main configuration structure containing all configurable settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct InterceptConfig {
    /// Codec and frame limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Compression-stage parameters.
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Memory-bounding limits applied while decoding untrusted input.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum size of one frame, before and after decompression.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Ceiling for string fields without a tighter per-site limit.
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
        }
    }
}

/// Parameters used when the host enables its compression stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompressionConfig {
    /// `"lz4"` or `"zstd"`.
    #[serde(default = "default_compression_kind")]
    pub kind: String,

    /// Frames below this size pass the stage uncompressed.
    #[serde(default = "default_compression_threshold")]
    pub threshold: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            kind: default_compression_kind(),
            threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }
}

impl CompressionConfig {
    pub fn kind(&self) -> Result<CompressionKind> {
        CompressionKind::from_str(&self.kind)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug`, or `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<Level> {
        Level::from_str(&self.level)
            .map_err(|_| ProtocolError::ConfigError(format!("invalid log level: {}", self.level)))
    }
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

fn default_max_string_bytes() -> usize {
    DEFAULT_MAX_STRING_BYTES
}

fn default_compression_kind() -> String {
    "lz4".to_string()
}

fn default_compression_threshold() -> usize {
    DEFAULT_COMPRESSION_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}

impl InterceptConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("PACKET_INTERCEPT_MAX_FRAME_BYTES") {
            if let Ok(parsed) = value.parse::<usize>() {
                config.limits.max_frame_bytes = parsed;
            }
        }
        if let Ok(value) = std::env::var("PACKET_INTERCEPT_MAX_STRING_BYTES") {
            if let Ok(parsed) = value.parse::<usize>() {
                config.limits.max_string_bytes = parsed;
            }
        }
        if let Ok(value) = std::env::var("PACKET_INTERCEPT_COMPRESSION_KIND") {
            config.compression.kind = value;
        }
        if let Ok(value) = std::env::var("PACKET_INTERCEPT_COMPRESSION_THRESHOLD") {
            if let Ok(parsed) = value.parse::<usize>() {
                config.compression.threshold = parsed;
            }
        }
        if let Ok(value) = std::env::var("PACKET_INTERCEPT_LOG_LEVEL") {
            config.logging.level = value;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.limits.max_frame_bytes == 0 {
            errors.push("limits.max_frame_bytes must be non-zero".to_string());
        }
        if self.limits.max_frame_bytes > 16 * 1024 * 1024 {
            errors.push(format!(
                "limits.max_frame_bytes {} exceeds the 16MB sanity cap",
                self.limits.max_frame_bytes
            ));
        }
        if self.limits.max_string_bytes == 0 {
            errors.push("limits.max_string_bytes must be non-zero".to_string());
        }
        if self.limits.max_string_bytes > self.limits.max_frame_bytes {
            errors.push("limits.max_string_bytes cannot exceed limits.max_frame_bytes".to_string());
        }
        if self.compression.kind().is_err() {
            errors.push(format!(
                "compression.kind {:?} is not one of: lz4, zstd",
                self.compression.kind
            ));
        }
        if self.compression.threshold > self.limits.max_frame_bytes {
            errors.push(
                "compression.threshold above limits.max_frame_bytes disables compression entirely"
                    .to_string(),
            );
        }
        if self.logging.tracing_level().is_err() {
            errors.push(format!("logging.level {:?} is invalid", self.logging.level));
        }

        errors
    }
}
