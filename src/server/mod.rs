//! Server instance implementations.
//!
//! A [`Runner`](crate::Runner) owns exactly one [`ServerInstance`], chosen
//! once when it starts:
//!
//! - **Embedded** ([`EmbeddedServer`]): a node built by the host's
//!   [`EmbeddedEngine`](crate::engine::EmbeddedEngine), running in-process
//! - **Separate process** ([`ProcessServer`]): the server binary, spawned and
//!   waited on by a background supervision task

mod embedded;
mod process;
mod types;

pub use embedded::*;
pub use process::*;
pub use types::*;
