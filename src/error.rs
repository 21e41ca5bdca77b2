// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(esrunner::config::error),
        help("Check the runner options: a disk-backed server needs a non-empty data directory")
    )]
    Config(String),

    #[error("EventStore executable not found at '{}'", .path.display())]
    #[diagnostic(
        code(esrunner::process::missing_executable),
        help("Copy the server binaries into an 'EventStoreBinaries' directory next to the running executable")
    )]
    MissingExecutable { path: PathBuf },

    #[error("Server failed to start: {0}")]
    #[diagnostic(
        code(esrunner::process::start_failed),
        help("Check that the server executable is runnable and its dependencies are installed")
    )]
    ServerStartFailed(String),

    #[error("Embedded node error: {0}")]
    #[diagnostic(code(esrunner::engine::error))]
    Engine(String),

    #[error("Timeout after {0:?} waiting for the server to start")]
    #[diagnostic(
        code(esrunner::start::timeout),
        help("The server may be slow to start. Increase start_timeout or remove it")
    )]
    Timeout(std::time::Duration),

    #[error("Failed to purge data directory '{}': {source}", .path.display())]
    #[diagnostic(
        code(esrunner::purge::failed),
        help("A file in the data directory may still be locked. Leftover data will be visible to the next run")
    )]
    Purge {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::MissingExecutable { path } => Some(format!(
                "Expected the server binary at {}. Run `esrunner paths` to see where the runner looks.",
                path.display()
            )),
            Error::Config(msg) if msg.contains("Could not find") => None,
            Error::Config(_) => Some(
                "Pass --data-dir or set data_directory in eventstore-runner.yaml".to_string(),
            ),
            Error::Timeout(_) => Some(
                "Raise --start-timeout, or omit it to start without waiting".to_string(),
            ),
            Error::Purge { path, .. } => Some(format!(
                "Stop anything holding files open under {} and run `esrunner purge`",
                path.display()
            )),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
