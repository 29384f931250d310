//! # Container Decoders
//!
//! Header parsing and the decoder engine for RIFF/WAVE streams.
//!
//! ## Architecture
//!
//! ```text
//! ByteSource ──> HeaderParser ──> FormatMetadata
//!      │                              │
//!      └──────> WavDecoder (state machine + streaming loop)
//!                    │
//!                    ├─ on_state_change ──> DecoderListener
//!                    └─ on_decoded ───────> DecoderListener
//! ```
//!
//! ## Threading Model
//!
//! Everything runs on the caller's thread. The only cross-call signal is the
//! [`PauseToken`](crate::PauseToken), checked once per loop iteration.

pub mod header;
mod wav;

pub use header::HeaderParser;
pub use wav::WavDecoder;
