// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `appkeeper`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "appkeeper",
    version,
    about = "Keep a web application running and run the daily report job.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Appkeeper.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Appkeeper.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `APPKEEPER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Action to perform.
    ///
    /// With no action, appkeeper reconciles: it starts the application only
    /// if it is not currently running. This is the form a periodic cron
    /// trigger invokes to self-heal crashes.
    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Lifecycle operations plus the report job.
#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// Start the application if it is not already running.
    Start,
    /// Stop the application unconditionally. Safe to repeat.
    Stop,
    /// Stop, wait a short delay, then start.
    Restart,
    /// Print whether the application is running and with which pid.
    Status,
    /// Run the report generator once and prune old artifacts.
    Report,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
