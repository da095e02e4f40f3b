//! Log file setup.
//!
//! The TUI owns the terminal, so tracing output goes to a file. The default
//! location is `<data dir>/candash/candash.log`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use super::config::{DashConfig, DEFAULT_LOG_FILTER};
use crate::error::ConfigError;

const LOG_DIR_NAME: &str = "candash";
const LOG_FILE_NAME: &str = "candash.log";

/// Resolve where the log file goes.
pub fn log_path(config: &DashConfig) -> Result<PathBuf, ConfigError> {
    if let Some(path) = &config.log_file {
        return Ok(path.clone());
    }
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
        .ok_or(ConfigError::NoLogDirectory)
}

/// Open the log file for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<File, ConfigError> {
    let to_config_error = |source| ConfigError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_config_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_config_error)
}

/// Build the filter, falling back to the default on invalid directives.
pub fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber writing to the configured log file.
///
/// Returns the path in use. A second call leaves the first subscriber
/// installed.
pub fn init_logging(config: &DashConfig) -> Result<PathBuf, ConfigError> {
    let path = log_path(config)?;
    let file = open_log_file(&path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    tracing::info!("candash {} logging to {}", crate::cli::VERSION, path.display());
    Ok(path)
}
