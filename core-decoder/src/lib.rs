//! # PCM Stream Decoder
//!
//! Decodes RIFF/WAVE containers into a stream of raw PCM bytes.
//!
//! ## Overview
//!
//! This crate provides:
//! - A strict, offset-checked RIFF/WAVE header parser
//! - A decoder lifecycle state machine with pause/resume/restart
//! - Synchronous listener fan-out for state changes and decoded bytes
//! - In-memory and `Read + Seek` byte sources
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_decoder::{AudioDecoder, DecoderListener, ReaderSource, TracingListener, WavDecoder};
//! use std::sync::Arc;
//!
//! # fn main() -> core_decoder::Result<()> {
//! let source = ReaderSource::open("/path/to/song.wav")?;
//! let mut decoder = WavDecoder::new(source);
//!
//! let logger: Arc<dyn DecoderListener> = Arc::new(TracingListener::new("song"));
//! decoder.add_listener(&logger);
//!
//! decoder.prepare()?;
//! decoder.start()?;
//! decoder.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod format;
pub mod listener;
pub mod source;
pub mod state;
pub mod traits;

pub use config::{DataScanLimit, DecoderConfig};
pub use decoder::{HeaderParser, WavDecoder};
pub use error::{DecoderError, HeaderError, ListenerError, Result, SourceError};
pub use format::{FormatMetadata, FormatMetadataBuilder, PCM_FORMAT_LINEAR};
pub use listener::{ListenerSet, PauseToken, TracingListener};
pub use source::{MemorySource, ReaderSource};
pub use state::DecoderState;
pub use traits::{
    AudioDecoder, ByteSource, DecoderListener, ListenerResult, ReadOutcome, SourceResult,
};
