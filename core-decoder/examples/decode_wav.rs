//! # WAV Decoding Example
//!
//! Decodes a WAV file (or a generated tone) and streams its PCM bytes to a
//! logging listener, pausing halfway and resuming.
//!
//! Run with:
//! ```bash
//! # Generated 440 Hz tone
//! cargo run --example decode_wav --package core-decoder
//!
//! # A file on disk, with debug logs
//! cargo run --example decode_wav --package core-decoder -- /path/to/file.wav debug
//! ```

use core_decoder::{
    AudioDecoder, ByteSource, DecoderConfig, DecoderListener, DecoderState, ListenerResult,
    MemorySource, PauseToken, ReaderSource, TracingListener, WavDecoder,
};
use core_runtime::logging::{init_logging, ConsoleLogger, LogFormat, LogLevel, LoggingConfig};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Pausing Listener
// ============================================================================

/// Pauses the decoder once `threshold` bytes have been delivered.
struct HalfwayPause {
    threshold: u64,
    seen: AtomicU64,
    token: PauseToken,
}

impl DecoderListener for HalfwayPause {
    fn on_state_change(&self, _state: &DecoderState) -> ListenerResult {
        Ok(())
    }

    fn on_decoded(&self, _buffer: &[u8], _start: usize, len: usize) -> ListenerResult {
        let before = self.seen.fetch_add(len as u64, Ordering::Relaxed);
        if before < self.threshold && before + len as u64 >= self.threshold {
            info!(bytes = before + len as u64, "Halfway, requesting pause");
            self.token.pause();
        }
        Ok(())
    }
}

// ============================================================================
// Tone Generator
// ============================================================================

/// One second of a 16-bit mono sine tone wrapped in a WAV container.
fn generate_tone(frequency: f64) -> Vec<u8> {
    let sample_rate = 8_000u32;
    let pcm: Vec<u8> = (0..sample_rate)
        .flat_map(|i| {
            let t = f64::from(i) / f64::from(sample_rate);
            let sample = ((2.0 * std::f64::consts::PI * frequency * t).sin() * 0.3 * 32_767.0) as i16;
            sample.to_le_bytes()
        })
        .collect();

    let mut bytes = Vec::with_capacity(44 + pcm.len());
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + pcm.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&pcm);
    bytes
}

fn run<S: ByteSource>(source: S, label: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder = WavDecoder::with_config(source, DecoderConfig::low_latency())?;

    let tracer = Arc::new(TracingListener::new(label));
    let tracer_handle: Arc<dyn DecoderListener> = tracer.clone();
    decoder.add_listener(&tracer_handle);

    decoder.prepare()?;
    info!(
        sample_rate = decoder.sample_rate(),
        channels = decoder.channel_count(),
        bits = decoder.bits_per_sample(),
        duration_ms = decoder.duration_ms(),
        "Prepared"
    );

    let data_size = decoder.metadata().map_or(0, |m| u64::from(m.data_chunk_size));
    let pauser: Arc<dyn DecoderListener> = Arc::new(HalfwayPause {
        threshold: data_size / 2,
        seen: AtomicU64::new(0),
        token: decoder.pause_handle(),
    });
    decoder.add_listener(&pauser);

    decoder.start()?;
    info!(streamed = decoder.bytes_streamed(), state = %decoder.state(), "Start returned");

    decoder.resume()?;
    info!(streamed = decoder.bytes_streamed(), state = %decoder.state(), "Resume returned");

    decoder.remove_listener(&pauser);
    decoder.restart()?;
    info!(
        streamed = decoder.bytes_streamed(),
        total_chunks = tracer.decoded_chunks(),
        total_bytes = tracer.decoded_bytes(),
        "Restart replayed the stream"
    );

    decoder.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let level: LogLevel = match args.get(2) {
        Some(level) => level.parse()?,
        None => LogLevel::Info,
    };

    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(level)
        .with_filter(format!("warn,decode_wav={0},core_decoder={0}", level.as_str()))
        .with_spans(false)
        .with_logger_sink(Arc::new(ConsoleLogger {
            min_level: LogLevel::Warn,
        }));
    init_logging(config)?;

    match args.get(1) {
        Some(path) => run(ReaderSource::open(path)?, path),
        None => run(MemorySource::from(generate_tone(440.0)), "tone"),
    }
}
