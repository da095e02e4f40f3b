//! candash - live CAN telemetry dashboard for the terminal
//!
//! Subscribes to a server-sent event stream of decoded CAN packets and shows
//! them as rolling charts or as a tree of the latest value per signal.
//!
//! This library exposes modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod error;
pub mod models;
pub mod presenter;
pub mod sse;
pub mod startup;
pub mod state;
pub mod stream;
pub mod terminal;
pub mod traits;
pub mod ui;
