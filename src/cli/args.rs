//! Command-line arguments.
//!
//! Every flag can also be set through a `CANDASH_*` environment variable.
//! A flag on the command line wins over the environment.

use clap::Parser;
use std::path::PathBuf;

use crate::app::View;
use crate::error::ConfigError;
use crate::startup::{
    parse_retention, parse_url, DEFAULT_LOG_FILTER, DEFAULT_STREAM_URL, ENV_LOG, ENV_LOG_FILE,
    ENV_RETENTION, ENV_URL, ENV_VIEW,
};
use crate::state::RetentionPolicy;

const KEYS_HELP: &str =
    "Keys: q quit, Tab switch view, Up/Down move, Enter toggle, e expand all, c collapse all";

/// Live CAN telemetry dashboard fed by a server-sent event stream.
///
/// # Examples
///
/// ```
/// use candash::cli::Cli;
/// use clap::Parser;
///
/// let cli = Cli::try_parse_from(["candash", "--view", "tree"]).unwrap();
/// assert_eq!(cli.view, Some(candash::app::View::Tree));
/// ```
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "candash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live CAN telemetry dashboard fed by a server-sent event stream")]
#[command(after_help = KEYS_HELP)]
pub struct Cli {
    /// Stream endpoint
    #[arg(long, env = ENV_URL, default_value = DEFAULT_STREAM_URL, value_parser = parse_url)]
    pub url: String,

    /// Initial view: charts or tree [default: charts]
    #[arg(long, env = ENV_VIEW, value_parser = parse_view)]
    pub view: Option<View>,

    /// Points kept per chart trace, 0 for unbounded [default: 2000]
    #[arg(long, env = ENV_RETENTION, value_name = "N", value_parser = parse_retention)]
    pub retention: Option<RetentionPolicy>,

    /// Log file; defaults to the user data directory
    #[arg(long, env = ENV_LOG_FILE, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives
    #[arg(long = "log", env = ENV_LOG, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

fn parse_view(raw: &str) -> Result<View, ConfigError> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("candash").chain(args.iter().copied()))
    }

    #[test]
    fn test_version_and_help_exit_early() {
        assert_eq!(parse(&["--version"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
        assert_eq!(parse(&["-V"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
        assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(
            parse(&["--url", "http://a/stream", "--help"]).unwrap_err().kind(),
            ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_all_options() {
        let cli = parse(&[
            "--url",
            "https://car.local/stream",
            "--view=tree",
            "--retention",
            "500",
            "--log-file",
            "/tmp/dash.log",
            "--log",
            "candash=trace",
        ])
        .unwrap();

        assert_eq!(cli.url, "https://car.local/stream");
        assert_eq!(cli.view, Some(View::Tree));
        assert_eq!(cli.retention, Some(RetentionPolicy::MaxPoints(500)));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/dash.log")));
        assert_eq!(cli.log_filter, "candash=trace");
    }

    #[test]
    fn test_retention_zero_is_unbounded() {
        let cli = parse(&["--retention", "0"]).unwrap();
        assert_eq!(cli.retention, Some(RetentionPolicy::Unbounded));
    }

    #[test]
    fn test_missing_value_and_unknown_flag() {
        assert_eq!(parse(&["--url"]).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(parse(&["--unknown"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for args in [
            &["--url", "ftp://x"][..],
            &["--view", "graph"][..],
            &["--retention", "many"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{:?}", args);
        }
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
