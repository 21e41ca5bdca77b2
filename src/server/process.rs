use super::{ProcessState, ServerInstance, ServerKind};
use crate::error::{Error, Result};
use crate::options::OutputMode;
use async_trait::async_trait;
use chrono::Utc;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything needed to launch the server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    executable: PathBuf,
    args: Vec<OsString>,
    work_dir: PathBuf,
    output: OutputMode,
}

impl ProcessSpec {
    pub fn new(executable: PathBuf, args: Vec<OsString>, work_dir: PathBuf, output: OutputMode) -> Self {
        Self {
            executable,
            args,
            work_dir,
            output,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to the executable, excluding the program name.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build the command: the executable itself (no shell), stdio per
    /// [`OutputMode`], killed if its handle is dropped.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match self.output {
            OutputMode::Passthrough => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Log => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Null => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        cmd
    }
}

/// The server binary running as a child process.
///
/// A dedicated tokio task spawns the child and waits for it to exit, so
/// neither spawning nor the process lifetime blocks the caller. The task
/// publishes every transition on a `watch` channel; failures there are never
/// swallowed. Stopping cancels the task, which kills the child and reaps it
/// before reporting [`ProcessState::Killed`].
pub struct ProcessServer {
    spec: ProcessSpec,
    state: watch::Receiver<ProcessState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ProcessServer {
    /// Hand `spec` to a new supervision task and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(spec: ProcessSpec) -> Self {
        let (tx, rx) = watch::channel(ProcessState::Starting);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(supervise(spec.clone(), tx, shutdown.clone()));

        Self {
            spec,
            state: rx,
            shutdown,
            task: Some(task),
        }
    }

    /// Wait until the child has been spawned.
    ///
    /// A child that already exited on its own counts as spawned. Fails with
    /// [`Error::ServerStartFailed`] if spawning failed, or [`Error::Timeout`]
    /// if the task reports nothing within `timeout`.
    pub async fn wait_until_running(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.state.clone();
        let outcome = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| !matches!(s, ProcessState::Starting)),
        )
        .await;

        let state = match outcome {
            Err(_) => return Err(Error::Timeout(timeout)),
            Ok(Err(_)) => {
                return Err(Error::ServerStartFailed(
                    "supervision task ended without reporting a state".to_string(),
                ))
            }
            Ok(Ok(state)) => state.clone(),
        };

        match state {
            ProcessState::Running { .. } | ProcessState::Exited { .. } => Ok(()),
            ProcessState::Failed { reason } => Err(Error::ServerStartFailed(reason)),
            other => Err(Error::ServerStartFailed(format!(
                "server {} before it was confirmed running",
                other
            ))),
        }
    }

    /// Wait for a terminal state and return it.
    pub async fn wait_for_exit(&self) -> ProcessState {
        wait_for_terminal(self.state.clone()).await
    }
}

pub(crate) async fn wait_for_terminal(mut rx: watch::Receiver<ProcessState>) -> ProcessState {
    if let Ok(state) = rx.wait_for(ProcessState::is_terminal).await {
        return state.clone();
    }
    // Sender gone without a terminal state; report the last thing we saw.
    let last = rx.borrow().clone();
    last
}

#[async_trait]
impl ServerInstance for ProcessServer {
    fn kind(&self) -> ServerKind {
        ServerKind::Process
    }

    #[tracing::instrument(skip(self), fields(executable = %self.spec.executable.display()))]
    async fn stop(&mut self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Supervision task ended abnormally: {}", e);
            }
        }
        tracing::debug!("Server process stopped: {}", *self.state.borrow());
        Ok(())
    }

    fn process_state(&self) -> Option<watch::Receiver<ProcessState>> {
        Some(self.state.clone())
    }
}

impl Drop for ProcessServer {
    fn drop(&mut self) {
        // Best effort: the task kills the child when it sees the token.
        // If the runtime is already gone, kill_on_drop takes care of it.
        self.shutdown.cancel();
    }
}

/// Spawn the child, then wait for whichever comes first: the child exiting
/// or the runner asking for termination.
async fn supervise(
    spec: ProcessSpec,
    state: watch::Sender<ProcessState>,
    shutdown: CancellationToken,
) {
    if shutdown.is_cancelled() {
        state.send_replace(ProcessState::Killed);
        return;
    }

    tracing::debug!(
        "Spawning {} with args {:?} in {}",
        spec.executable.display(),
        spec.args,
        spec.work_dir.display()
    );

    let mut child = match spec.command().spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(
                "Failed to spawn {}: {} (work_dir: {:?})",
                spec.executable.display(),
                e,
                spec.work_dir
            );
            state.send_replace(ProcessState::Failed {
                reason: format!("spawning {}: {}", spec.executable.display(), e),
            });
            return;
        }
    };

    if spec.output.is_log() {
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, "stderr");
        }
    }

    let pid = child.id().unwrap_or_default();
    tracing::info!("EventStore server running (PID {})", pid);
    state.send_replace(ProcessState::Running {
        pid,
        started_at: Utc::now(),
    });

    tokio::select! {
        result = child.wait() => {
            match result {
                Ok(status) => {
                    tracing::info!("EventStore server exited: {}", status);
                    state.send_replace(ProcessState::Exited { code: status.code() });
                }
                Err(e) => {
                    tracing::warn!("Failed waiting on server process {}: {}", pid, e);
                    if let Err(kill_err) = child.start_kill() {
                        tracing::debug!("Kill after wait failure: {}", kill_err);
                    }
                    state.send_replace(ProcessState::Failed {
                        reason: format!("waiting on PID {}: {}", pid, e),
                    });
                }
            }
        }
        _ = shutdown.cancelled() => {
            // The child may have exited between the wait and the kill; that is fine.
            if let Err(e) = child.start_kill() {
                tracing::debug!("Server process {} already gone: {}", pid, e);
            }
            match child.wait().await {
                Ok(status) => tracing::debug!("Server process {} reaped: {}", pid, status),
                Err(e) => tracing::warn!("Failed to reap server process {}: {}", pid, e),
            }
            state.send_replace(ProcessState::Killed);
        }
    }
}

fn forward_lines<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => tracing::info!(target: "eventstore", stream, "{}", line),
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("Stopped reading server {}: {}", stream, e);
                    break;
                }
            }
        }
    });
}
