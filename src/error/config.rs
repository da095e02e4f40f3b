//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling the dashboard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL does not use http or https.
    #[error("Invalid stream URL '{0}': expected an http:// or https:// URL")]
    InvalidUrl(String),

    #[error("Unknown view '{0}': expected 'charts' or 'tree'")]
    InvalidView(String),

    #[error("Invalid retention '{0}': expected a number of points (0 for unbounded)")]
    InvalidRetention(String),

    /// No log path given and no data directory could be determined.
    #[error("Could not determine a location for the log file")]
    NoLogDirectory,

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ConfigError::InvalidView("graph".to_string()).to_string(),
            "Unknown view 'graph': expected 'charts' or 'tree'"
        );
        assert_eq!(
            ConfigError::InvalidRetention("-1".to_string()).to_string(),
            "Invalid retention '-1': expected a number of points (0 for unbounded)"
        );
    }

    #[test]
    fn test_log_file_error_has_source() {
        let err = ConfigError::LogFile {
            path: PathBuf::from("/nope/candash.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
