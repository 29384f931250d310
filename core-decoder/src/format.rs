//! # Format Metadata
//!
//! Header fields extracted from a RIFF/WAVE stream, and the builder the parser
//! fills in field by field.

use crate::error::HeaderError;
use serde::{Deserialize, Serialize};

/// Format code for uncompressed linear PCM.
pub const PCM_FORMAT_LINEAR: u16 = 1;

/// Header metadata of a parsed WAV stream.
///
/// Only ever produced whole, by [`FormatMetadataBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMetadata {
    /// Declared size of the RIFF payload (bytes 4-7).
    pub container_size: u32,
    /// Raw bytes 12-15, normally `"fmt "`.
    pub format_chunk_marker: [u8; 4],
    /// Length of the format chunk body.
    pub format_chunk_length: u32,
    /// Encoding code, `1` for linear PCM.
    pub pcm_format_code: u16,
    pub channel_count: u16,
    /// Samples per second per channel.
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    /// Bytes per frame across all channels.
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Declared size of the data chunk.
    pub data_chunk_size: u32,
    /// Offset of the first PCM byte.
    pub data_offset: u64,
}

impl FormatMetadata {
    /// Duration in milliseconds.
    ///
    /// Computed as `(container_size - format_chunk_length) / avg_bytes_per_second * 1000`
    /// with integer division. This approximates the payload length from the
    /// container size rather than the data chunk size. Returns 0 when the byte
    /// rate is 0.
    pub fn duration_ms(&self) -> i64 {
        let payload = i64::from(self.container_size) - i64::from(self.format_chunk_length);
        payload
            .checked_div(i64::from(self.avg_bytes_per_second))
            .map_or(0, |secs| secs * 1000)
    }

    /// Returns `true` if the stream declares uncompressed PCM.
    pub fn is_linear_pcm(&self) -> bool {
        self.pcm_format_code == PCM_FORMAT_LINEAR
    }

    /// The format chunk marker as text, with non-printable bytes escaped.
    pub fn format_chunk_marker_lossy(&self) -> String {
        self.format_chunk_marker
            .iter()
            .flat_map(|b| std::ascii::escape_default(*b))
            .map(char::from)
            .collect()
    }
}

/// Accumulates header fields while parsing.
///
/// Nothing is observable until [`build`](Self::build) succeeds with every
/// field present.
#[derive(Debug, Default)]
pub struct FormatMetadataBuilder {
    container_size: Option<u32>,
    format_chunk_marker: Option<[u8; 4]>,
    format_chunk_length: Option<u32>,
    pcm_format_code: Option<u16>,
    channel_count: Option<u16>,
    sample_rate: Option<u32>,
    avg_bytes_per_second: Option<u32>,
    block_align: Option<u16>,
    bits_per_sample: Option<u16>,
    data_chunk_size: Option<u32>,
    data_offset: Option<u64>,
}

impl FormatMetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container_size(&mut self, value: u32) -> &mut Self {
        self.container_size = Some(value);
        self
    }

    pub fn format_chunk_marker(&mut self, value: [u8; 4]) -> &mut Self {
        self.format_chunk_marker = Some(value);
        self
    }

    pub fn format_chunk_length(&mut self, value: u32) -> &mut Self {
        self.format_chunk_length = Some(value);
        self
    }

    pub fn pcm_format_code(&mut self, value: u16) -> &mut Self {
        self.pcm_format_code = Some(value);
        self
    }

    pub fn channel_count(&mut self, value: u16) -> &mut Self {
        self.channel_count = Some(value);
        self
    }

    pub fn sample_rate(&mut self, value: u32) -> &mut Self {
        self.sample_rate = Some(value);
        self
    }

    pub fn avg_bytes_per_second(&mut self, value: u32) -> &mut Self {
        self.avg_bytes_per_second = Some(value);
        self
    }

    pub fn block_align(&mut self, value: u16) -> &mut Self {
        self.block_align = Some(value);
        self
    }

    pub fn bits_per_sample(&mut self, value: u16) -> &mut Self {
        self.bits_per_sample = Some(value);
        self
    }

    pub fn data_chunk_size(&mut self, value: u32) -> &mut Self {
        self.data_chunk_size = Some(value);
        self
    }

    pub fn data_offset(&mut self, value: u64) -> &mut Self {
        self.data_offset = Some(value);
        self
    }

    /// Assemble the metadata, failing if any field was never set.
    pub fn build(&self) -> Result<FormatMetadata, HeaderError> {
        Ok(FormatMetadata {
            container_size: require(self.container_size, "container size")?,
            format_chunk_marker: require(self.format_chunk_marker, "format chunk marker")?,
            format_chunk_length: require(self.format_chunk_length, "format chunk length")?,
            pcm_format_code: require(self.pcm_format_code, "format code")?,
            channel_count: require(self.channel_count, "channel count")?,
            sample_rate: require(self.sample_rate, "sample rate")?,
            avg_bytes_per_second: require(self.avg_bytes_per_second, "average bytes per second")?,
            block_align: require(self.block_align, "block align")?,
            bits_per_sample: require(self.bits_per_sample, "bits per sample")?,
            data_chunk_size: require(self.data_chunk_size, "data chunk size")?,
            data_offset: require(self.data_offset, "data offset")?,
        })
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, HeaderError> {
    value.ok_or(HeaderError::IncompleteHeader(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cd_quality() -> FormatMetadata {
        let mut builder = FormatMetadataBuilder::new();
        builder
            .container_size(176_436)
            .format_chunk_marker(*b"fmt ")
            .format_chunk_length(16)
            .pcm_format_code(PCM_FORMAT_LINEAR)
            .channel_count(2)
            .sample_rate(44_100)
            .avg_bytes_per_second(176_400)
            .block_align(4)
            .bits_per_sample(16)
            .data_chunk_size(176_400)
            .data_offset(44);
        builder.build().unwrap()
    }

    #[test]
    fn test_builder_assembles_all_fields() {
        let meta = cd_quality();
        assert_eq!(meta.sample_rate, 44_100);
        assert_eq!(meta.channel_count, 2);
        assert!(meta.is_linear_pcm());
        assert_eq!(meta.format_chunk_marker_lossy(), "fmt ");
    }

    #[test]
    fn test_builder_reports_first_missing_field() {
        let mut builder = FormatMetadataBuilder::new();
        builder.container_size(100).format_chunk_marker(*b"fmt ");
        match builder.build() {
            Err(HeaderError::IncompleteHeader(field)) => assert_eq!(field, "format chunk length"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duration_uses_container_minus_format_length() {
        let meta = cd_quality();
        // (176436 - 16) / 176400 = 1 -> 1000 ms
        assert_eq!(meta.duration_ms(), 1000);

        let long = FormatMetadata {
            container_size: 1_000_016,
            avg_bytes_per_second: 16_000,
            ..meta.clone()
        };
        // 1_000_000 / 16_000 = 62 (truncated) -> 62_000 ms
        assert_eq!(long.duration_ms(), 62_000);
    }

    #[test]
    fn test_duration_is_zero_without_byte_rate() {
        let meta = FormatMetadata {
            avg_bytes_per_second: 0,
            ..cd_quality()
        };
        assert_eq!(meta.duration_ms(), 0);
    }

    #[test]
    fn test_duration_can_go_negative_for_tiny_containers() {
        let meta = FormatMetadata {
            container_size: 4,
            format_chunk_length: 16,
            avg_bytes_per_second: 1,
            ..cd_quality()
        };
        assert_eq!(meta.duration_ms(), -12_000);
    }
}
