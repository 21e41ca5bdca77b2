use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "esrunner")]
#[command(about = "EventStore Runner - start, supervise and tear down an EventStore server")]
pub struct Cli {
    /// Options file (defaults to eventstore-runner.yaml, searched upward; optional)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base directory for the server binaries and relative data directories
    /// (defaults to the directory of this executable)
    #[arg(short, long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override the options file.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionOverrides {
    /// Data directory, absolute or relative to the base directory
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server as a separate process until Ctrl-C or until it exits
    Run {
        #[command(flatten)]
        overrides: OptionOverrides,

        /// Delete the data directory after the server stops
        #[arg(long)]
        purge: bool,

        /// Wait at most this long for the server process to spawn (e.g. 10s, 500ms)
        #[arg(long, value_name = "DURATION")]
        start_timeout: Option<String>,

        /// What to do with server output: passthrough, log or null
        #[arg(long, value_name = "MODE")]
        output: Option<String>,
    },
    /// Delete the resolved data directory
    Purge {
        #[command(flatten)]
        overrides: OptionOverrides,
    },
    /// Show where the runner looks for the server and its data
    Paths {
        #[command(flatten)]
        overrides: OptionOverrides,
    },
}
