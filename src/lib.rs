//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-decoder`, `core-runtime`). Host applications can
//! depend on `pcm-decoder-workspace` and enable the documented features without
//! needing to wire each crate individually.

#[cfg(feature = "decoder")]
pub use core_decoder as decoder;

#[cfg(feature = "runtime")]
pub use core_runtime as runtime;
