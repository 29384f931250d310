//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the decoder crates and their hosts:
//! - Logging and tracing subscriber setup
//! - Forwarding log events to host sinks
//!
//! ## Overview
//!
//! Library crates in this workspace only emit `tracing` events. Binaries and
//! demos call [`logging::init_logging`] once at startup to decide the output
//! format, the filter, and whether events are mirrored to a [`logging::LoggerSink`].

pub mod error;
pub mod logging;

pub use error::{Error, Result};
