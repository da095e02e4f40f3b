//! Error types for candash.
//!
//! - [`StreamError`] covers everything that can go wrong between the
//!   dashboard and the telemetry server, with helpers that drive the
//!   reconnect decision (`is_retryable`) and the status bar
//!   (`user_message`, `error_code`).
//! - [`ConfigError`] covers flag values and log setup.
//!
//! The binary itself reports fatal errors through `color_eyre`.

mod config;
mod stream;

pub use config::ConfigError;
pub use stream::StreamError;

/// Result alias for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
