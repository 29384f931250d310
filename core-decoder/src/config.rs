//! # Decoder Configuration
//!
//! Configuration types for header parsing and the streaming loop.

use crate::error::{DecoderError, Result};
use serde::{Deserialize, Serialize};

/// How far the parser may scan past the format chunk looking for `"data"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataScanLimit {
    /// Scan until the source ends.
    #[default]
    Unbounded,
    /// Stop once the cursor passes the declared container size plus the
    /// 8-byte RIFF preamble.
    ContainerSize,
    /// Stop after scanning this many bytes past offset 36.
    MaxBytes(u64),
}

/// Decoder configuration.
///
/// Controls the streaming read size and how the header parser hunts for the
/// data chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Size of the reusable read buffer handed to listeners, in bytes.
    ///
    /// Default: 2048.
    #[serde(default = "default_read_buffer_bytes")]
    pub read_buffer_bytes: usize,

    /// Bound on the data-marker scan.
    ///
    /// Default: [`DataScanLimit::Unbounded`].
    #[serde(default)]
    pub data_scan_limit: DataScanLimit,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            read_buffer_bytes: default_read_buffer_bytes(),
            data_scan_limit: DataScanLimit::default(),
        }
    }
}

impl DecoderConfig {
    /// Smaller reads, so listeners see data sooner and pauses land faster.
    pub fn low_latency() -> Self {
        Self {
            read_buffer_bytes: 512,
            ..Default::default()
        }
    }

    /// Refuse to scan past the declared container size.
    pub fn strict() -> Self {
        Self {
            data_scan_limit: DataScanLimit::ContainerSize,
            ..Default::default()
        }
    }

    /// Builder-style override of the read buffer size.
    pub fn with_read_buffer_bytes(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes;
        self
    }

    /// Builder-style override of the data scan limit.
    pub fn with_data_scan_limit(mut self, limit: DataScanLimit) -> Self {
        self.data_scan_limit = limit;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.read_buffer_bytes == 0 {
            return Err("read_buffer_bytes must be > 0".to_string());
        }

        if self.data_scan_limit == DataScanLimit::MaxBytes(0) {
            return Err("data_scan_limit max_bytes must be > 0".to_string());
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DecoderError::InvalidConfig(format!("Malformed config: {}", e)))?;
        config.validate().map_err(DecoderError::InvalidConfig)?;
        Ok(config)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_read_buffer_bytes() -> usize {
    2048
}
