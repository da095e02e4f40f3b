//! Command-line interface.
//!
//! Parsed first thing in `main()`, before the terminal is touched.
//! `--help` and `--version` print and exit from inside `Cli::parse`:
//!
//! ```ignore
//! use candash::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let config = DashConfig::from_cli(&cli);
//! ```

pub mod args;
pub mod version;

pub use args::Cli;
pub use version::VERSION;
