//! # Decoder State
//!
//! Lifecycle states reported to listeners and exposed through
//! [`AudioDecoder::state`](crate::AudioDecoder::state).

use crate::error::DecoderError;
use std::fmt;

/// Current lifecycle state of a decoder.
///
/// ```text
/// Idle ──prepare──> Preparing ──> Prepared ──start──> Running ──> Stopped
///                       │                    ^           │  ^        │
///                       v                    └─restart───┘  └─resume─┘
///                     Error{Preparing}
/// ```
#[derive(Debug, Clone)]
pub enum DecoderState {
    /// Freshly created, header not read.
    Idle,
    /// Header parsing in progress.
    Preparing,
    /// Header parsed, source positioned at the first PCM byte.
    Prepared,
    /// Streaming loop is active.
    Running,
    /// Streaming loop exited (end of data or pause).
    Stopped,
    /// An operation faulted.
    Error {
        /// State that was current when the fault happened. Diagnostic only.
        previous_state: Box<DecoderState>,
        message: String,
        cause: Option<DecoderError>,
    },
}

impl DecoderState {
    pub(crate) fn error(previous: DecoderState, cause: DecoderError) -> Self {
        DecoderState::Error {
            previous_state: Box::new(previous),
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// Returns `true` for [`DecoderState::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, DecoderState::Error { .. })
    }

    /// Returns `true` while the streaming loop is active.
    pub fn is_running(&self) -> bool {
        matches!(self, DecoderState::Running)
    }

    /// State that preceded an error, if this is an error.
    pub fn previous_state(&self) -> Option<&DecoderState> {
        match self {
            DecoderState::Error { previous_state, .. } => Some(previous_state),
            _ => None,
        }
    }

    /// Short variant name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            DecoderState::Idle => "idle",
            DecoderState::Preparing => "preparing",
            DecoderState::Prepared => "prepared",
            DecoderState::Running => "running",
            DecoderState::Stopped => "stopped",
            DecoderState::Error { .. } => "error",
        }
    }
}

// The cause is not compared: errors wrapping I/O failures have no equality.
impl PartialEq for DecoderState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                DecoderState::Error {
                    previous_state: a,
                    message: m1,
                    ..
                },
                DecoderState::Error {
                    previous_state: b,
                    message: m2,
                    ..
                },
            ) => a == b && m1 == m2,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Eq for DecoderState {}

impl fmt::Display for DecoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderState::Error {
                previous_state,
                message,
                ..
            } => write!(f, "error (while {}): {}", previous_state.name(), message),
            other => f.write_str(other.name()),
        }
    }
}
