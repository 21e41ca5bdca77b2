//! # EventStore Runner
//!
//! Start an EventStore server for tests or application hosting, and tear it
//! down again deterministically.
//!
//! ## Features
//!
//! - **Two server kinds**: an embedded node built by a host-supplied
//!   [`EmbeddedEngine`](engine::EmbeddedEngine), or the server binary as a
//!   separate process
//! - **Fluent options**: [`RunnerOptions::builder`] with embedded, in-memory
//!   defaults
//! - **Idempotent stop**: [`Runner::stop`] tears down once, however often it
//!   is called
//! - **Purge on stop**: the data directory is deleted after the server has
//!   stopped, never while it runs
//! - **Observable supervision**: failures of the background process task are
//!   published through [`Runner::process_state`]
//! - **Optional readiness wait**: bound start-up with a start timeout
//!
//! ## Quick Start
//!
//! ```no_run
//! use eventstore_runner::{Runner, RunnerOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), eventstore_runner::Error> {
//! let options = RunnerOptions::builder()
//!     .full_server()
//!     .data_directory("data")
//!     .purge_data()
//!     .start_timeout(Duration::from_secs(10))
//!     .build();
//!
//! let runner = Runner::start(options).await?;
//! runner.stop().await?;
//! runner.stop().await?; // no-op
//! # Ok(())
//! # }
//! ```
//!
//! ## Filesystem layout
//!
//! The server binary is expected at
//! `<base>/EventStoreBinaries/EventStore.ClusterNode` (`.exe` on Windows),
//! where `<base>` is the running executable's directory unless overridden
//! with [`RunnerBuilder::base_directory`]. Relative data directories are
//! resolved against the same base.

pub mod engine;
pub mod error;
pub mod options;
pub mod paths;
pub mod runner;
pub mod server;

// Re-export commonly used types
pub use error::{Error, Result};
pub use options::{OutputMode, RunnerOptions, RunnerOptionsBuilder};
pub use runner::{Runner, RunnerBuilder};
pub use server::{ProcessState, ServerKind};
