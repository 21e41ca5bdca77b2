use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::watch;

/// Which kind of server a runner is supervising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    Embedded,
    Process,
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerKind::Embedded => write!(f, "embedded"),
            ServerKind::Process => write!(f, "process"),
        }
    }
}

/// Lifecycle of a separate server process, as reported by its supervision task.
///
/// ```text
/// Starting ──► Running ──► Exited
///    │            │
///    │            └──────► Killed
///    └──► Failed
/// ```
///
/// `Exited`, `Killed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    /// The supervision task has not spawned the child yet.
    Starting,
    /// The child was spawned.
    Running { pid: u32, started_at: DateTime<Utc> },
    /// The child exited on its own. `code` is `None` when it died from a signal.
    Exited { code: Option<i32> },
    /// The child was terminated by the runner.
    Killed,
    /// Spawning or waiting on the child failed.
    Failed { reason: String },
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessState::Exited { .. } | ProcessState::Killed | ProcessState::Failed { .. }
        )
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            ProcessState::Running { pid, .. } => Some(*pid),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Starting => write!(f, "starting"),
            ProcessState::Running { pid, .. } => write!(f, "running (PID {})", pid),
            ProcessState::Exited { code: Some(code) } => write!(f, "exited with code {}", code),
            ProcessState::Exited { code: None } => write!(f, "exited by signal"),
            ProcessState::Killed => write!(f, "killed"),
            ProcessState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Common contract of the two server kinds.
///
/// Implementations are started by their own constructors; the runner only
/// ever stops them, once.
#[async_trait]
pub trait ServerInstance: Send + Sync {
    fn kind(&self) -> ServerKind;

    /// Stop the server and release its handle.
    ///
    /// Must not return before the server has let go of its data directory.
    #[must_use = "ignoring this result means the server may still be running"]
    async fn stop(&mut self) -> Result<()>;

    /// Subscription to process lifecycle updates. `None` for embedded nodes.
    fn process_state(&self) -> Option<watch::Receiver<ProcessState>> {
        None
    }
}
