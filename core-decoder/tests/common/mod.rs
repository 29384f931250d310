//! Shared fixtures for decoder integration tests.

#![allow(dead_code)]

use core_decoder::{DecoderListener, DecoderState, ListenerError, ListenerResult, PauseToken};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// WAV Fixtures
// ============================================================================

/// Header field values for a synthetic WAV stream.
#[derive(Debug, Clone)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub format_code: u16,
    /// Overrides the computed container size.
    pub container_size: Option<u32>,
    /// Chunks inserted between the format chunk and the data chunk.
    pub extra_chunks: Vec<u8>,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            format_code: 1,
            container_size: None,
            extra_chunks: Vec::new(),
        }
    }
}

impl WavSpec {
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    pub fn with_chunk(mut self, id: &[u8; 4], body: &[u8]) -> Self {
        self.extra_chunks.extend_from_slice(id);
        self.extra_chunks
            .extend_from_slice(&(body.len() as u32).to_le_bytes());
        self.extra_chunks.extend_from_slice(body);
        self
    }

    /// Serialize header plus `pcm` as a complete stream.
    pub fn build(&self, pcm: &[u8]) -> Vec<u8> {
        let container = self
            .container_size
            .unwrap_or(36 + self.extra_chunks.len() as u32 + pcm.len() as u32);

        let mut bytes = Vec::with_capacity(44 + self.extra_chunks.len() + pcm.len());
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&container.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&self.format_code.to_le_bytes());
        bytes.extend_from_slice(&self.channels.to_le_bytes());
        bytes.extend_from_slice(&self.sample_rate.to_le_bytes());
        bytes.extend_from_slice(&self.byte_rate().to_le_bytes());
        bytes.extend_from_slice(&self.block_align().to_le_bytes());
        bytes.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        bytes.extend_from_slice(&self.extra_chunks);
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
        bytes.extend_from_slice(pcm);
        bytes
    }
}

/// Deterministic non-repeating PCM payload.
pub fn pcm_ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ============================================================================
// Recording Listener
// ============================================================================

/// Listener that records every callback.
#[derive(Default)]
pub struct RecordingListener {
    pub states: Mutex<Vec<DecoderState>>,
    pub chunks: Mutex<Vec<Vec<u8>>>,
    /// Pause the decoder once this many chunks have arrived.
    pause_after: Mutex<Option<(usize, PauseToken)>>,
    /// Fail `on_decoded` on this chunk index.
    fail_on_chunk: Mutex<Option<usize>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pause_after(&self, chunks: usize, token: PauseToken) {
        *self.pause_after.lock() = Some((chunks, token));
    }

    pub fn cancel_pause(&self) {
        *self.pause_after.lock() = None;
    }

    pub fn fail_on_chunk(&self, index: usize) {
        *self.fail_on_chunk.lock() = Some(index);
    }

    pub fn states(&self) -> Vec<DecoderState> {
        self.states.lock().clone()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.chunks.lock().concat()
    }

    pub fn clear(&self) {
        self.states.lock().clear();
        self.chunks.lock().clear();
    }
}

impl DecoderListener for RecordingListener {
    fn on_state_change(&self, state: &DecoderState) -> ListenerResult {
        self.states.lock().push(state.clone());
        Ok(())
    }

    fn on_decoded(&self, buffer: &[u8], start: usize, len: usize) -> ListenerResult {
        let index = self.chunk_count();
        if *self.fail_on_chunk.lock() == Some(index) {
            return Err(ListenerError::new(format!("refused chunk {}", index)));
        }

        self.chunks.lock().push(buffer[start..start + len].to_vec());

        if let Some((after, token)) = self.pause_after.lock().as_ref() {
            if index + 1 == *after {
                token.pause();
            }
        }
        Ok(())
    }
}

/// Coerce a recorder into the handle type the decoder registers.
pub fn as_listener(recorder: &Arc<RecordingListener>) -> Arc<dyn DecoderListener> {
    recorder.clone()
}
