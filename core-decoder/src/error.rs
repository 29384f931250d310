//! # Decoder Error Types
//!
//! Error types for header parsing, byte sources, listener dispatch and the
//! decoder lifecycle.
//!
//! Every error here is `Clone` so that [`DecoderState::Error`](crate::DecoderState)
//! can carry the fault that caused it while the same fault is returned to the
//! caller. I/O errors are shared through an `Arc` for that reason.

use std::io;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Byte Source Errors
// ============================================================================

/// Errors raised by a [`ByteSource`](crate::ByteSource) implementation.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Underlying read, seek or close failed.
    #[error("Source I/O failure: {0}")]
    Io(Arc<io::Error>),

    /// `reset()` was called before any mark was captured.
    #[error("Source has no mark to reset to")]
    NoMark,

    /// The source was already closed.
    #[error("Source is closed")]
    Closed,
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(Arc::new(err))
    }
}

// ============================================================================
// Header Errors
// ============================================================================

/// Errors raised while parsing the RIFF/WAVE header.
#[derive(Error, Debug, Clone)]
pub enum HeaderError {
    /// A magic marker byte did not match. `found` is `None` when the source
    /// ended inside the marker.
    #[error(
        "Bad {marker} marker: byte {index} at offset {offset} expected {expected:#04x}, found {}",
        found.map(|b| format!("{:#04x}", b)).unwrap_or_else(|| "end of data".to_string())
    )]
    BadMagic {
        marker: &'static str,
        index: usize,
        offset: u64,
        expected: u8,
        found: Option<u8>,
    },

    /// The source ended (or the scan limit was hit) before a "data" marker.
    #[error("No data chunk found between offset {scanned_from} and {reached}")]
    MissingDataChunk { scanned_from: u64, reached: u64 },

    /// A fixed-position read did not land on its documented offset.
    ///
    /// This is a parser defect, never an input problem.
    #[error("Offset drift reading {field}: expected offset {expected}, cursor at {actual}")]
    OffsetDrift {
        field: &'static str,
        expected: u64,
        actual: u64,
    },

    /// The source ended in the middle of a fixed header field.
    #[error("Unexpected end of data reading {field} at offset {offset}")]
    UnexpectedEnd { field: &'static str, offset: u64 },

    /// The metadata builder was finished without every field set.
    #[error("Header incomplete: {0} was never parsed")]
    IncompleteHeader(&'static str),

    /// The byte source failed while the header was being read.
    #[error(transparent)]
    Source(#[from] SourceError),
}

// ============================================================================
// Listener Errors
// ============================================================================

/// Fault raised by a [`DecoderListener`](crate::DecoderListener) callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener fault: {message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Decoder Errors
// ============================================================================

/// Errors surfaced by decoder lifecycle operations.
#[derive(Error, Debug, Clone)]
pub enum DecoderError {
    /// Header parsing failed during `prepare()`.
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// The byte source failed while streaming, rewinding or closing.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A registered listener returned an error.
    #[error(transparent)]
    ListenerFault(#[from] ListenerError),

    /// Decoder configuration is invalid.
    #[error("Invalid decoder config: {0}")]
    InvalidConfig(String),

    /// The decoder was closed and its source released.
    #[error("Decoder is closed")]
    Closed,
}

impl DecoderError {
    /// Returns `true` if the input is not a usable RIFF/WAVE stream.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DecoderError::Header(
                HeaderError::BadMagic { .. }
                    | HeaderError::MissingDataChunk { .. }
                    | HeaderError::UnexpectedEnd { .. }
            )
        )
    }

    /// Returns `true` if the underlying byte source failed.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            DecoderError::Source(_) | DecoderError::Header(HeaderError::Source(_))
        )
    }

    /// Returns `true` if this error indicates a bug in the parser itself.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            DecoderError::Header(HeaderError::OffsetDrift { .. } | HeaderError::IncompleteHeader(_))
        )
    }
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, DecoderError>;
