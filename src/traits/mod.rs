//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`Presenter`] - Consumes telemetry records and owns the resulting view state

pub mod presenter;

pub use presenter::Presenter;
