//! Dashboard configuration.
//!
//! Built from defaults overlaid with the parsed [`Cli`] flags. The flags
//! carry their `CANDASH_*` environment fallbacks.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::app::View;
use crate::cli::Cli;
use crate::error::ConfigError;
use crate::state::RetentionPolicy;
use crate::stream::SubscriberConfig;

/// Stream endpoint used when none is configured
pub const DEFAULT_STREAM_URL: &str = "http://localhost:8000/stream";

/// Tracing filter used when neither `--log` nor `CANDASH_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const ENV_URL: &str = "CANDASH_URL";
pub const ENV_VIEW: &str = "CANDASH_VIEW";
pub const ENV_RETENTION: &str = "CANDASH_RETENTION";
pub const ENV_LOG: &str = "CANDASH_LOG";
pub const ENV_LOG_FILE: &str = "CANDASH_LOG_FILE";

/// Configuration for one dashboard run.
///
/// # Example
///
/// ```ignore
/// use candash::startup::DashConfig;
///
/// let config = DashConfig::from_cli(&Cli::parse())
///     .with_url("http://10.0.0.2:8000/stream")
///     .with_view(View::Tree);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DashConfig {
    /// SSE endpoint
    pub url: String,
    /// View shown at startup
    pub view: View,
    /// Point retention per chart trace
    pub retention: RetentionPolicy,
    /// Explicit log file; `None` uses the data directory
    pub log_file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,
    /// Flag the stream as stale after this long without a record
    pub stale_after: Duration,
    /// Reconnect attempts before giving up; `None` retries forever
    pub max_retries: Option<u32>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STREAM_URL.to_string(),
            view: View::Charts,
            retention: RetentionPolicy::default(),
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            stale_after: Duration::from_secs(5),
            max_retries: None,
        }
    }
}

impl DashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the config from parsed flags and their environment fallbacks.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            view: cli.view.unwrap_or_default(),
            retention: cli.retention.unwrap_or_default(),
            log_file: cli.log_file.clone(),
            log_filter: cli.log_filter.clone(),
            ..Self::default()
        }
    }

    /// Subscriber settings derived from this config
    pub fn subscriber_config(&self) -> SubscriberConfig {
        SubscriberConfig {
            url: self.url.clone(),
            max_retries: self.max_retries,
            ..SubscriberConfig::default()
        }
    }
}

impl FromStr for View {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "charts" | "chart" => Ok(View::Charts),
            "tree" => Ok(View::Tree),
            _ => Err(ConfigError::InvalidView(s.to_string())),
        }
    }
}

/// Accept only http and https URLs.
pub fn parse_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim();
    let has_host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .map(|rest| !rest.is_empty() && !rest.starts_with('/'))
        .unwrap_or(false);
    if has_host {
        Ok(url.to_string())
    } else {
        Err(ConfigError::InvalidUrl(raw.to_string()))
    }
}

/// Parse a point count; `0` means unbounded.
pub fn parse_retention(raw: &str) -> Result<RetentionPolicy, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map(RetentionPolicy::from_points)
        .map_err(|_| ConfigError::InvalidRetention(raw.to_string()))
}
