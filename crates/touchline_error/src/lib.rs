//! Error types for the touchline workspace.
//!
//! This crate provides the foundation error types shared by every touchline crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use touchline_error::{ConfigError, TouchlineResult};
//!
//! fn load() -> TouchlineResult<String> {
//!     Err(ConfigError::new("GEMINI_API_KEY is not set"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod json;
mod platform;
mod storage;

pub use config::ConfigError;
pub use error::{TouchlineError, TouchlineErrorKind, TouchlineResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use json::JsonError;
pub use platform::{PlatformError, PlatformErrorKind};
pub use storage::{StorageError, StorageErrorKind};
