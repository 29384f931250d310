//! # WAV Decoder Engine
//!
//! Lifecycle state machine and streaming loop for RIFF/WAVE streams.

use crate::config::DecoderConfig;
use crate::decoder::header::HeaderParser;
use crate::error::{DecoderError, Result};
use crate::format::FormatMetadata;
use crate::listener::{ListenerSet, PauseToken};
use crate::state::DecoderState;
use crate::traits::{AudioDecoder, ByteSource, DecoderListener, ReadOutcome};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Why the streaming loop last exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    EndOfData,
    Paused,
}

/// Decoder for RIFF/WAVE streams carrying raw PCM.
///
/// Owns its byte source. All operations run synchronously on the calling
/// thread; `start`, `resume` and `restart` return once the stream ends or a
/// pause is observed.
///
/// ## State Management
///
/// - `prepare()` parses the header once; the metadata is published only if
///   the whole header parsed.
/// - The streaming loop re-enters across pause/resume without re-parsing.
/// - `restart()` is the only operation that rewinds, to the mark captured
///   after the header.
pub struct WavDecoder<S: ByteSource> {
    source: S,
    parser: HeaderParser,
    state: DecoderState,
    metadata: Option<FormatMetadata>,
    listeners: ListenerSet,
    pause: PauseToken,
    buffer: Vec<u8>,
    stop_reason: Option<StopReason>,
    prepare_attempted: bool,
    /// PCM bytes delivered since the mark.
    streamed: u64,
    closed: bool,
}

impl<S: ByteSource> WavDecoder<S> {
    /// Create a decoder with the default configuration.
    pub fn new(source: S) -> Self {
        Self::build(source, DecoderConfig::default())
    }

    /// Create a decoder with a custom configuration.
    ///
    /// # Errors
    ///
    /// [`DecoderError::InvalidConfig`] if the configuration fails validation.
    pub fn with_config(source: S, config: DecoderConfig) -> Result<Self> {
        config.validate().map_err(DecoderError::InvalidConfig)?;
        Ok(Self::build(source, config))
    }

    fn build(source: S, config: DecoderConfig) -> Self {
        Self {
            source,
            parser: HeaderParser::new(config.data_scan_limit),
            state: DecoderState::Idle,
            metadata: None,
            listeners: ListenerSet::new(),
            pause: PauseToken::new(),
            buffer: vec![0u8; config.read_buffer_bytes],
            stop_reason: None,
            prepare_attempted: false,
            streamed: 0,
            closed: false,
        }
    }

    /// Parsed header, once `prepare()` has succeeded.
    pub fn metadata(&self) -> Option<&FormatMetadata> {
        self.metadata.as_ref()
    }

    /// Handle that pauses this decoder's streaming loop.
    ///
    /// Give a clone to a listener or another thread to stop streaming while
    /// `start()`/`resume()`/`restart()` is running.
    pub fn pause_handle(&self) -> PauseToken {
        self.pause.clone()
    }

    /// PCM bytes delivered to listeners since the playback origin.
    pub fn bytes_streamed(&self) -> u64 {
        self.streamed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(DecoderError::Closed);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------------

    fn transition(&mut self, state: DecoderState) -> Result<()> {
        debug!("Decoder state {} -> {}", self.state.name(), state.name());
        self.state = state;
        if let Err(fault) = self.listeners.notify_state(&self.state) {
            return Err(self.fail(fault.into()));
        }
        Ok(())
    }

    /// Move to `Error`, notify listeners, and hand back the fault to return.
    fn fail(&mut self, cause: DecoderError) -> DecoderError {
        error!("Decoder fault while {}: {}", self.state.name(), cause);
        let previous = std::mem::replace(&mut self.state, DecoderState::Idle);
        self.state = DecoderState::error(previous, cause.clone());
        if let Err(fault) = self.listeners.notify_state(&self.state) {
            warn!("Listener failed while being notified of an error: {}", fault);
        }
        cause
    }

    // ------------------------------------------------------------------------
    // Streaming loop
    // ------------------------------------------------------------------------

    fn stream(&mut self) -> Result<()> {
        self.transition(DecoderState::Running)?;
        info!(position = self.streamed, "Streaming PCM data");

        let reason = loop {
            if self.pause.is_paused() {
                break StopReason::Paused;
            }

            let n = match self.source.read(&mut self.buffer) {
                Ok(ReadOutcome::Data(0)) => {
                    warn!("Source returned an empty read, treating as end of data");
                    break StopReason::EndOfData;
                }
                Ok(ReadOutcome::Data(n)) => n,
                Ok(ReadOutcome::EndOfData) => break StopReason::EndOfData,
                Err(e) => return Err(self.fail(e.into())),
            };

            self.streamed += n as u64;
            if let Err(fault) = self.listeners.notify_decoded(&self.buffer, 0, n) {
                return Err(self.fail(fault.into()));
            }
        };

        match reason {
            StopReason::EndOfData => info!(bytes = self.streamed, "PCM data fully read"),
            StopReason::Paused => info!(bytes = self.streamed, "PCM streaming paused"),
        }
        self.stop_reason = Some(reason);
        self.transition(DecoderState::Stopped)
    }
}

impl<S: ByteSource> AudioDecoder for WavDecoder<S> {
    fn sample_rate(&self) -> u32 {
        self.metadata.as_ref().map_or(0, |m| m.sample_rate)
    }

    fn channel_count(&self) -> u16 {
        self.metadata.as_ref().map_or(0, |m| m.channel_count)
    }

    fn bits_per_sample(&self) -> u16 {
        self.metadata.as_ref().map_or(0, |m| m.bits_per_sample)
    }

    fn duration_ms(&self) -> i64 {
        self.metadata.as_ref().map_or(0, FormatMetadata::duration_ms)
    }

    fn state(&self) -> DecoderState {
        self.state.clone()
    }

    #[instrument(skip(self))]
    fn prepare(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.prepare_attempted || self.state != DecoderState::Idle {
            debug!("prepare() ignored in state {}", self.state.name());
            return Ok(());
        }
        self.prepare_attempted = true;

        self.transition(DecoderState::Preparing)?;
        match self.parser.parse(&mut self.source) {
            Ok(metadata) => {
                info!(
                    sample_rate = metadata.sample_rate,
                    channels = metadata.channel_count,
                    bits = metadata.bits_per_sample,
                    duration_ms = metadata.duration_ms(),
                    "WAV header parsed"
                );
                self.metadata = Some(metadata);
                self.transition(DecoderState::Prepared)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    #[instrument(skip(self))]
    fn start(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.state != DecoderState::Prepared {
            warn!("start() ignored: decoder is {}", self.state.name());
            return Ok(());
        }
        self.pause.clear();
        self.stream()
    }

    fn pause(&self) {
        debug!("Pause requested");
        self.pause.pause();
    }

    #[instrument(skip(self))]
    fn resume(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.state != DecoderState::Stopped || self.stop_reason != Some(StopReason::Paused) {
            warn!("resume() ignored: decoder is {}, not paused", self.state.name());
            return Ok(());
        }
        self.pause.clear();
        self.stream()
    }

    #[instrument(skip(self))]
    fn restart(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.metadata.is_none() {
            warn!("restart() ignored: no header has been parsed");
            return Ok(());
        }

        if let Err(e) = self.source.reset() {
            return Err(self.fail(e.into()));
        }
        self.pause.clear();
        self.streamed = 0;
        self.stop_reason = None;
        self.transition(DecoderState::Prepared)?;
        self.stream()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.source.close()?;
        self.closed = true;
        debug!("Decoder source closed");
        Ok(())
    }

    fn add_listener(&mut self, listener: &Arc<dyn DecoderListener>) -> bool {
        self.listeners.add(listener)
    }

    fn remove_listener(&mut self, listener: &Arc<dyn DecoderListener>) -> bool {
        self.listeners.remove(listener)
    }
}

impl<S: ByteSource> std::fmt::Debug for WavDecoder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavDecoder")
            .field("state", &self.state)
            .field("metadata", &self.metadata)
            .field("listeners", &self.listeners)
            .field("streamed", &self.streamed)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn tiny_wav() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8_000u32.to_le_bytes());
        bytes.extend_from_slice(&16_000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        bytes
    }

    #[test]
    fn test_properties_are_zero_before_prepare() {
        let decoder = WavDecoder::new(MemorySource::from(tiny_wav()));
        assert_eq!(decoder.sample_rate(), 0);
        assert_eq!(decoder.channel_count(), 0);
        assert_eq!(decoder.duration_ms(), 0);
        assert!(decoder.metadata().is_none());
        assert_eq!(decoder.state(), DecoderState::Idle);
    }

    #[test]
    fn test_stream_without_listeners_counts_bytes() {
        let mut decoder = WavDecoder::new(MemorySource::from(tiny_wav()));
        decoder.prepare().unwrap();
        decoder.start().unwrap();
        assert_eq!(decoder.state(), DecoderState::Stopped);
        assert_eq!(decoder.bytes_streamed(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DecoderConfig::default().with_read_buffer_bytes(0);
        let result = WavDecoder::with_config(MemorySource::from(tiny_wav()), config);
        assert!(matches!(result, Err(DecoderError::InvalidConfig(_))));
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_operations() {
        let mut decoder = WavDecoder::new(MemorySource::from(tiny_wav()));
        decoder.close().unwrap();
        decoder.close().unwrap();
        assert!(decoder.is_closed());
        assert!(matches!(decoder.prepare(), Err(DecoderError::Closed)));
        assert_eq!(decoder.state(), DecoderState::Idle);
    }
}
