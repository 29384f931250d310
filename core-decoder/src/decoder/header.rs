//! # RIFF/WAVE Header Parser
//!
//! Walks the canonical 44-byte header, checking the cursor against each
//! field's documented offset before reading it, then hunts for the `"data"`
//! marker past any unknown chunks.
//!
//! | Offset | Size | Field |
//! |-------:|-----:|-------|
//! | 0 | 4 | `"RIFF"` |
//! | 4 | 4 | container size (LE) |
//! | 8 | 4 | `"WAVE"` |
//! | 12 | 4 | format chunk marker (unvalidated) |
//! | 16 | 4 | format chunk length (LE) |
//! | 20 | 2 | format code (LE) |
//! | 22 | 2 | channel count (LE) |
//! | 24 | 4 | sample rate (LE) |
//! | 28 | 4 | average bytes per second (LE) |
//! | 32 | 2 | block align (LE) |
//! | 34 | 2 | bits per sample (LE) |
//! | 36.. | | scan for `"data"` |
//! | marker + 4 | 4 | data chunk size (LE) |

use crate::config::DataScanLimit;
use crate::error::HeaderError;
use crate::format::{FormatMetadata, FormatMetadataBuilder, PCM_FORMAT_LINEAR};
use crate::traits::ByteSource;
use tracing::{debug, instrument, warn};

pub const RIFF_MARKER: &[u8; 4] = b"RIFF";
pub const WAVE_MARKER: &[u8; 4] = b"WAVE";
pub const DATA_MARKER: &[u8; 4] = b"data";

/// Offset where the data-marker scan begins.
pub const DATA_SCAN_START: u64 = 36;

const RIFF_PREAMBLE_BYTES: u64 = 8;

/// Parser for the RIFF/WAVE header.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser {
    scan_limit: DataScanLimit,
}

impl HeaderParser {
    pub fn new(scan_limit: DataScanLimit) -> Self {
        Self { scan_limit }
    }

    /// Parse the header from the start of `source`.
    ///
    /// On success the source is positioned at the first PCM byte and marked
    /// there.
    #[instrument(skip(self, source), level = "debug")]
    pub fn parse<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<FormatMetadata, HeaderError> {
        let mut cursor = HeaderCursor::new(source);
        let mut builder = FormatMetadataBuilder::new();

        cursor.expect_marker(RIFF_MARKER, "RIFF", 0)?;
        debug!("RIFF marker verified");

        let container_size = cursor.read_u32_le("container size", 4)?;
        debug!(container_size, "Container size");
        builder.container_size(container_size);

        cursor.expect_marker(WAVE_MARKER, "WAVE", 8)?;
        debug!("WAVE marker verified");

        let marker = cursor.read_array::<4>("format chunk marker", 12)?;
        debug!(marker = ?marker, "Format chunk marker");
        builder.format_chunk_marker(marker);

        let format_chunk_length = cursor.read_u32_le("format chunk length", 16)?;
        debug!(format_chunk_length, "Format chunk length");
        builder.format_chunk_length(format_chunk_length);

        let format_code = cursor.read_u16_le("format code", 20)?;
        if format_code != PCM_FORMAT_LINEAR {
            warn!(format_code, "Format code is not linear PCM, streaming bytes as-is");
        } else {
            debug!(format_code, "Format code");
        }
        builder.pcm_format_code(format_code);

        let channel_count = cursor.read_u16_le("channel count", 22)?;
        debug!(channel_count, "Channel count");
        builder.channel_count(channel_count);

        let sample_rate = cursor.read_u32_le("sample rate", 24)?;
        debug!(sample_rate, "Sample rate");
        builder.sample_rate(sample_rate);

        let avg_bytes_per_second = cursor.read_u32_le("average bytes per second", 28)?;
        debug!(avg_bytes_per_second, "Average bytes per second");
        builder.avg_bytes_per_second(avg_bytes_per_second);

        let block_align = cursor.read_u16_le("block align", 32)?;
        debug!(block_align, "Block align");
        builder.block_align(block_align);

        let bits_per_sample = cursor.read_u16_le("bits per sample", 34)?;
        debug!(bits_per_sample, "Bits per sample");
        builder.bits_per_sample(bits_per_sample);

        let limit = self.scan_end(container_size);
        let marker_offset = cursor.scan_for_marker(DATA_MARKER, limit)?;
        debug!(marker_offset, "Data marker found");

        let data_chunk_size = cursor.read_u32_le("data chunk size", marker_offset + 4)?;
        debug!(data_chunk_size, "Data chunk size");
        builder.data_chunk_size(data_chunk_size);

        let data_offset = cursor.offset();
        builder.data_offset(data_offset);

        let metadata = builder.build()?;
        cursor.source.mark()?;
        debug!(data_offset, "Marked playback origin");

        Ok(metadata)
    }

    /// Exclusive offset at which the data scan gives up, if bounded.
    fn scan_end(&self, container_size: u32) -> Option<u64> {
        match self.scan_limit {
            DataScanLimit::Unbounded => None,
            DataScanLimit::ContainerSize => {
                Some(u64::from(container_size) + RIFF_PREAMBLE_BYTES)
            }
            DataScanLimit::MaxBytes(n) => Some(DATA_SCAN_START.saturating_add(n)),
        }
    }
}

/// Byte source plus the logical offset consumed so far.
struct HeaderCursor<'a, S: ?Sized> {
    source: &'a mut S,
    offset: u64,
}

impl<'a, S: ByteSource + ?Sized> HeaderCursor<'a, S> {
    fn new(source: &'a mut S) -> Self {
        Self { source, offset: 0 }
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn expect_offset(&self, field: &'static str, expected: u64) -> Result<(), HeaderError> {
        if self.offset != expected {
            return Err(HeaderError::OffsetDrift {
                field,
                expected,
                actual: self.offset,
            });
        }
        Ok(())
    }

    fn next_byte(&mut self) -> Result<Option<u8>, HeaderError> {
        let byte = self.source.read_byte()?;
        if byte.is_some() {
            self.offset += 1;
        }
        Ok(byte)
    }

    fn require_byte(&mut self, field: &'static str) -> Result<u8, HeaderError> {
        let offset = self.offset;
        self.next_byte()?
            .ok_or(HeaderError::UnexpectedEnd { field, offset })
    }

    fn expect_marker(
        &mut self,
        marker: &[u8; 4],
        name: &'static str,
        at: u64,
    ) -> Result<(), HeaderError> {
        self.expect_offset(name, at)?;
        for (index, &expected) in marker.iter().enumerate() {
            let offset = self.offset;
            let found = self.next_byte()?;
            if found != Some(expected) {
                return Err(HeaderError::BadMagic {
                    marker: name,
                    index,
                    offset,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(
        &mut self,
        field: &'static str,
        at: u64,
    ) -> Result<[u8; N], HeaderError> {
        self.expect_offset(field, at)?;
        let mut bytes = [0u8; N];
        for slot in bytes.iter_mut() {
            *slot = self.require_byte(field)?;
        }
        Ok(bytes)
    }

    fn read_u16_le(&mut self, field: &'static str, at: u64) -> Result<u16, HeaderError> {
        self.read_array::<2>(field, at).map(u16::from_le_bytes)
    }

    fn read_u32_le(&mut self, field: &'static str, at: u64) -> Result<u32, HeaderError> {
        self.read_array::<4>(field, at).map(u32::from_le_bytes)
    }

    /// Consume bytes until the last four read equal `marker`; returns the
    /// offset of the marker's first byte.
    ///
    /// Unknown chunks are not interpreted, only skipped over.
    fn scan_for_marker(&mut self, marker: &[u8; 4], end: Option<u64>) -> Result<u64, HeaderError> {
        self.expect_offset("data marker scan", DATA_SCAN_START)?;
        let mut window = [0u8; 4];
        let mut filled = 0usize;

        loop {
            if end.is_some_and(|end| self.offset >= end) {
                warn!(offset = self.offset, "Data marker scan limit reached");
                break;
            }
            let Some(byte) = self.next_byte()? else {
                break;
            };
            window.rotate_left(1);
            window[3] = byte;
            filled = (filled + 1).min(4);
            if filled == 4 && &window == marker {
                return Ok(self.offset - 4);
            }
        }

        Err(HeaderError::MissingDataChunk {
            scanned_from: DATA_SCAN_START,
            reached: self.offset,
        })
    }
}
