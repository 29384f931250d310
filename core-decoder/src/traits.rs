//! # Core Decoder Traits
//!
//! The abstractions the decoder is built around:
//!
//! - [`ByteSource`]: the byte stream a decoder reads from. Owned exclusively by
//!   one decoder.
//! - [`DecoderListener`]: observers that receive state changes and decoded
//!   bytes, synchronously, on the thread driving the decoder.
//! - [`AudioDecoder`]: the public decoder contract. [`WavDecoder`](crate::WavDecoder)
//!   is the only implementation.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_decoder::{AudioDecoder, DecoderListener, MemorySource, WavDecoder};
//! use std::sync::Arc;
//!
//! fn play(bytes: Vec<u8>, listener: Arc<dyn DecoderListener>) -> core_decoder::Result<()> {
//!     let mut decoder = WavDecoder::new(MemorySource::from(bytes));
//!     decoder.add_listener(&listener);
//!
//!     decoder.prepare()?;
//!     println!("{} Hz, {} ms", decoder.sample_rate(), decoder.duration_ms());
//!     decoder.start()?;
//!     decoder.close()
//! }
//! ```

use crate::error::{ListenerError, Result, SourceError};
use crate::state::DecoderState;
use std::sync::Arc;

// ============================================================================
// Byte Source
// ============================================================================

/// Outcome of a bulk read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were written to the front of the buffer.
    Data(usize),
    /// The source has no more bytes.
    EndOfData,
}

/// Result type for byte source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Sequential byte stream with a single rewind point.
///
/// End of stream is always reported explicitly (`Ok(None)` /
/// [`ReadOutcome::EndOfData`]), never as a byte value.
pub trait ByteSource {
    /// Read one byte. `Ok(None)` at end of data.
    fn read_byte(&mut self) -> SourceResult<Option<u8>>;

    /// Read up to `buf.len()` bytes into the front of `buf`.
    ///
    /// Blocks until at least one byte is available or the stream ends. A
    /// decoder treats `Data(0)` for a non-empty buffer as end of data.
    fn read(&mut self, buf: &mut [u8]) -> SourceResult<ReadOutcome>;

    /// Remember the current position, replacing any earlier mark.
    fn mark(&mut self) -> SourceResult<()>;

    /// Return to the last mark.
    ///
    /// # Errors
    ///
    /// [`SourceError::NoMark`] if `mark()` was never called.
    fn reset(&mut self) -> SourceResult<()>;

    /// Release the underlying resource. Closing twice is not an error.
    fn close(&mut self) -> SourceResult<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> SourceResult<Option<u8>> {
        (**self).read_byte()
    }

    fn read(&mut self, buf: &mut [u8]) -> SourceResult<ReadOutcome> {
        (**self).read(buf)
    }

    fn mark(&mut self) -> SourceResult<()> {
        (**self).mark()
    }

    fn reset(&mut self) -> SourceResult<()> {
        (**self).reset()
    }

    fn close(&mut self) -> SourceResult<()> {
        (**self).close()
    }
}

// ============================================================================
// Listener
// ============================================================================

/// Result type returned by listener callbacks.
pub type ListenerResult = std::result::Result<(), ListenerError>;

/// Observer of decoder state and decoded PCM bytes.
///
/// Callbacks run synchronously inside the decoder call that triggered them and
/// must not block. Returning an error faults that decoder call.
///
/// A listener cannot call back into the decoder that is notifying it; to stop
/// streaming from inside `on_decoded`, hold a [`PauseToken`](crate::PauseToken).
pub trait DecoderListener {
    /// Called after every state transition.
    fn on_state_change(&self, state: &DecoderState) -> ListenerResult;

    /// Called with `buffer[start..start + len]` holding freshly decoded bytes.
    ///
    /// The buffer is reused for the next read; copy anything kept past the
    /// callback.
    fn on_decoded(&self, buffer: &[u8], start: usize, len: usize) -> ListenerResult;
}

// ============================================================================
// Decoder Contract
// ============================================================================

/// Public contract of a container decoder.
///
/// Numeric properties read as 0 until `prepare()` succeeds.
pub trait AudioDecoder {
    /// Samples per second per channel.
    fn sample_rate(&self) -> u32;

    fn channel_count(&self) -> u16;

    fn bits_per_sample(&self) -> u16;

    /// Duration in milliseconds, derived from the header.
    fn duration_ms(&self) -> i64;

    /// Snapshot of the current state.
    fn state(&self) -> DecoderState;

    /// Parse the header. Runs at most once per decoder.
    ///
    /// # Errors
    ///
    /// Returns the header, source or listener fault that moved the decoder to
    /// [`DecoderState::Error`].
    fn prepare(&mut self) -> Result<()>;

    /// Stream PCM bytes to listeners until end of data or pause. A no-op
    /// unless the decoder is prepared.
    fn start(&mut self) -> Result<()>;

    /// Ask the streaming loop to stop at its next iteration.
    fn pause(&self);

    /// Continue streaming after a pause, from where it stopped.
    fn resume(&mut self) -> Result<()>;

    /// Rewind to the first PCM byte and stream again.
    fn restart(&mut self) -> Result<()>;

    /// Release the byte source. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Register a listener. Returns `false` if it was already registered.
    fn add_listener(&mut self, listener: &Arc<dyn DecoderListener>) -> bool;

    /// Unregister a listener. Returns `false` if it was not registered.
    fn remove_listener(&mut self, listener: &Arc<dyn DecoderListener>) -> bool;
}
