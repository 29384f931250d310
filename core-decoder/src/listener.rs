//! # Listener Dispatch
//!
//! [`ListenerSet`] holds weak, identity-keyed listener handles in registration
//! order and fans events out to them. [`PauseToken`] is the one piece of
//! decoder control a listener (or another thread) may hold while the streaming
//! loop runs. [`TracingListener`] is a ready-made observer that logs decoder
//! activity.
//!
//! ## Dispatch faults
//!
//! Dispatch stops at the first listener that returns an error; listeners
//! registered after it do not see that event. The error is handed back to the
//! decoder, which faults the operation in progress.

use crate::error::ListenerError;
use crate::state::DecoderState;
use crate::traits::{DecoderListener, ListenerResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

// ============================================================================
// ListenerSet
// ============================================================================

/// Ordered set of weakly held listeners.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Weak<dyn DecoderListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns `false` if it is already present.
    pub fn add(&mut self, listener: &Arc<dyn DecoderListener>) -> bool {
        self.prune();
        if self.position(listener).is_some() {
            return false;
        }
        self.listeners.push(Arc::downgrade(listener));
        true
    }

    /// Unregister a listener. Returns `false` if it was not present.
    pub fn remove(&mut self, listener: &Arc<dyn DecoderListener>) -> bool {
        self.prune();
        match self.position(listener) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a state change to every live listener, in order.
    pub fn notify_state(&self, state: &DecoderState) -> ListenerResult {
        for listener in self.live() {
            listener.on_state_change(state)?;
        }
        Ok(())
    }

    /// Deliver decoded bytes to every live listener, in order.
    pub fn notify_decoded(&self, buffer: &[u8], start: usize, len: usize) -> ListenerResult {
        for listener in self.live() {
            listener.on_decoded(buffer, start, len)?;
        }
        Ok(())
    }

    fn live(&self) -> impl Iterator<Item = Arc<dyn DecoderListener>> + '_ {
        self.listeners.iter().filter_map(Weak::upgrade)
    }

    // Compares data addresses only; vtable pointers for one type may differ
    // across codegen units.
    fn position(&self, listener: &Arc<dyn DecoderListener>) -> Option<usize> {
        let target = Arc::as_ptr(listener) as *const ();
        self.listeners
            .iter()
            .position(|weak| weak.as_ptr() as *const () == target)
    }

    fn prune(&mut self) {
        self.listeners.retain(|weak| weak.strong_count() > 0);
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("live", &self.len())
            .finish()
    }
}

// ============================================================================
// PauseToken
// ============================================================================

/// Shared pause flag for a decoder's streaming loop.
///
/// The loop checks the flag before each read, so a pause lands at the next
/// iteration boundary, never mid-read.
///
/// # Examples
///
/// ```
/// use core_decoder::PauseToken;
///
/// let token = PauseToken::new();
/// let from_listener = token.clone();
///
/// from_listener.pause();
/// assert!(token.is_paused());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PauseToken {
    paused: Arc<AtomicBool>,
}

impl PauseToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pause.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// TracingListener
// ============================================================================

/// Listener that logs state changes and decoded byte counts via `tracing`.
#[derive(Debug, Default)]
pub struct TracingListener {
    label: String,
    decoded_bytes: AtomicU64,
    decoded_chunks: AtomicU64,
}

impl TracingListener {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Total bytes seen in `on_decoded` so far.
    pub fn decoded_bytes(&self) -> u64 {
        self.decoded_bytes.load(Ordering::Relaxed)
    }

    /// Number of `on_decoded` calls so far.
    pub fn decoded_chunks(&self) -> u64 {
        self.decoded_chunks.load(Ordering::Relaxed)
    }
}

impl DecoderListener for TracingListener {
    fn on_state_change(&self, state: &DecoderState) -> ListenerResult {
        match state {
            DecoderState::Error { .. } => warn!(decoder = %self.label, "Decoder state: {}", state),
            DecoderState::Stopped => info!(
                decoder = %self.label,
                bytes = self.decoded_bytes(),
                chunks = self.decoded_chunks(),
                "Decoder stopped"
            ),
            _ => info!(decoder = %self.label, "Decoder state: {}", state),
        }
        Ok(())
    }

    fn on_decoded(&self, buffer: &[u8], start: usize, len: usize) -> ListenerResult {
        if start + len > buffer.len() {
            return Err(ListenerError::new(format!(
                "chunk {}..{} exceeds buffer of {} bytes",
                start,
                start + len,
                buffer.len()
            )));
        }
        self.decoded_chunks.fetch_add(1, Ordering::Relaxed);
        let total = self.decoded_bytes.fetch_add(len as u64, Ordering::Relaxed) + len as u64;
        debug!(decoder = %self.label, len, total, "Decoded chunk");
        Ok(())
    }
}
