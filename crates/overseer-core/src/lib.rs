//! # overseer-core
//!
//! Core types for the overseer admin/audit subsystem: the error taxonomy,
//! settings, and logging setup. This crate has no knowledge of models or
//! history records and provides the foundation for the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types, structured store-error codes, result alias
//! - [`settings`] - Subsystem configuration
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{OverseerError, OverseerResult, StoreError, StoreErrorKind, ValidationError};
pub use settings::Settings;
