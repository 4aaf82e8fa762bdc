//! # overseer
//!
//! Model-agnostic admin reflection and audit history for Rust ORMs.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `overseer` to get everything, or depend on
//! individual crates for finer-grained control.

/// Core types: error taxonomy, settings, and logging setup.
pub use overseer_core as core;

/// Normalized model reflection, the model registry, and the storage adapter.
#[cfg(feature = "model")]
pub use overseer_model as model;

/// Change history: describer, store, summaries, and tracking entry points.
#[cfg(feature = "history")]
pub use overseer_history as history;
