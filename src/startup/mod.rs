//! Startup: configuration and logging.
//!
//! - [`config`] - `DashConfig` assembled from defaults and parsed flags
//! - [`logging`] - file-backed tracing subscriber
//!
//! # Usage
//!
//! ```ignore
//! use candash::startup::{init_logging, DashConfig};
//!
//! let config = DashConfig::from_cli(&Cli::parse());
//! let log_path = init_logging(&config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{
    parse_retention, parse_url, DashConfig, DEFAULT_LOG_FILTER, DEFAULT_STREAM_URL, ENV_LOG,
    ENV_LOG_FILE, ENV_RETENTION, ENV_URL, ENV_VIEW,
};
pub use logging::{env_filter, init_logging, log_path, open_log_file};
