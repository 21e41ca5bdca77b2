use crate::engine::{EmbeddedEngine, NodeConfig, StorageMode};
use crate::error::{Error, Result};
use crate::options::RunnerOptions;
use crate::paths;
use crate::server::{
    wait_for_terminal, EmbeddedServer, ProcessServer, ProcessSpec, ProcessState, ServerInstance,
    ServerKind,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Supervises one EventStore server from start to teardown.
///
/// Starting picks the server kind once from [`RunnerOptions`] and never
/// switches. [`stop`](Runner::stop) is the only way out of the running state;
/// it stops the server, then purges the data directory if asked to.
///
/// # Example
///
/// ```no_run
/// use eventstore_runner::{Runner, RunnerOptions};
///
/// # async fn example() -> Result<(), eventstore_runner::Error> {
/// let options = RunnerOptions::builder()
///     .full_server()
///     .data_directory("data")
///     .purge_data()
///     .build();
///
/// let runner = Runner::start(options).await?;
/// // ... talk to the server through its own client ...
/// runner.stop().await?;
/// # Ok(())
/// # }
/// ```
///
/// ## Concurrency
///
/// `stop` takes `&self`. Concurrent callers are serialized: the first one
/// tears down, the others wait for it and return `Ok(())` without doing
/// anything.
pub struct Runner {
    options: RunnerOptions,
    base_directory: PathBuf,
    kind: ServerKind,
    /// `None` once stopped. Held across awaits during teardown.
    server: tokio::sync::Mutex<Option<Box<dyn ServerInstance>>>,
    process_state: Option<watch::Receiver<ProcessState>>,
    stopped: AtomicBool,
    purged: AtomicBool,
}

impl Runner {
    /// Start a server using the executable's own directory as base directory.
    pub async fn start(options: RunnerOptions) -> Result<Self> {
        RunnerBuilder::new(options).start().await
    }

    pub fn builder(options: RunnerOptions) -> RunnerBuilder {
        RunnerBuilder::new(options)
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Directory that relative data directories and the executable are resolved against.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn kind(&self) -> ServerKind {
        self.kind
    }

    /// The data directory the server stores into, or `None` for a pure
    /// in-memory node.
    pub fn data_directory(&self) -> Option<PathBuf> {
        data_path(&self.base_directory, &self.options)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// True once [`stop`](Runner::stop) has deleted an existing data directory.
    /// Stays false when purging was off or there was nothing to delete.
    pub fn purged(&self) -> bool {
        self.purged.load(Ordering::SeqCst)
    }

    /// PID of a separate server process, while it is running.
    pub fn pid(&self) -> Option<u32> {
        self.process_state.as_ref().and_then(|rx| rx.borrow().pid())
    }

    /// Subscribe to lifecycle updates of a separate server process.
    ///
    /// This is where failures of the background supervision task surface.
    /// `None` for embedded nodes.
    pub fn process_state(&self) -> Option<watch::Receiver<ProcessState>> {
        self.process_state.clone()
    }

    /// Wait until a separate server process has exited, been killed or
    /// failed. Returns `None` immediately for embedded nodes.
    pub async fn wait_for_exit(&self) -> Option<ProcessState> {
        let rx = self.process_state.clone()?;
        Some(wait_for_terminal(rx).await)
    }

    /// Stop the server, then purge its data directory if configured.
    ///
    /// Only the first call does anything; later calls return `Ok(())`. The
    /// purge never starts before the server is fully stopped, and is skipped
    /// if stopping failed. A failed purge is returned as [`Error::Purge`].
    #[tracing::instrument(skip(self), fields(kind = %self.kind))]
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.server.lock().await;
        let Some(mut server) = slot.take() else {
            tracing::debug!("Runner already stopped, skipping");
            return Ok(());
        };

        let stop_result = server.stop().await;
        drop(server);
        self.stopped.store(true, Ordering::SeqCst);

        if let Err(e) = stop_result {
            tracing::warn!("Server did not stop cleanly, leaving data in place: {}", e);
            return Err(e);
        }

        if self.options.purge_data() {
            if let Some(path) = self.data_directory() {
                if paths::purge_directory(&path)? {
                    self.purged.store(true, Ordering::SeqCst);
                }
            }
        }

        tracing::debug!("Runner stopped");
        Ok(())
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        // Nothing to do after an explicit stop. Otherwise the server's own
        // Drop starts teardown in the background; purging is never safe here
        // since we cannot wait for the server to let go of its data.
        if let Some(server) = self.server.get_mut().take() {
            tracing::warn!(
                "Runner dropped without stop(); stopping {} server in the background, data directory left in place",
                server.kind()
            );
            drop(server);
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("options", &self.options)
            .field("base_directory", &self.base_directory)
            .field("kind", &self.kind)
            .field("stopped", &self.is_stopped())
            .field("pid", &self.pid())
            .finish_non_exhaustive()
    }
}

/// Resolved data directory, or `None` when nothing touches the filesystem.
fn data_path(base: &Path, options: &RunnerOptions) -> Option<PathBuf> {
    if options.is_pure_in_memory() || options.data_directory().is_empty() {
        return None;
    }
    Some(paths::resolve_data_directory(base, options.data_directory()))
}

/// Like [`data_path`] but for a server that needs a directory.
fn required_data_path(base: &Path, options: &RunnerOptions) -> Result<PathBuf> {
    data_path(base, options).ok_or_else(|| {
        Error::Config(
            "A data directory is required unless running an embedded in-memory node".to_string(),
        )
    })
}

/// Builder for starting a [`Runner`] with an explicit base directory or an
/// embedded engine.
///
/// ```no_run
/// use eventstore_runner::{Runner, RunnerOptions};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), eventstore_runner::Error> {
/// let runner = Runner::builder(RunnerOptions::builder().data_directory("db").build())
///     .base_directory(PathBuf::from("/opt/app"))
///     .start()
///     .await?;
/// # runner.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct RunnerBuilder {
    options: RunnerOptions,
    base_directory: Option<PathBuf>,
    engine: Option<Arc<dyn EmbeddedEngine>>,
}

impl RunnerBuilder {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            options,
            base_directory: None,
            engine: None,
        }
    }

    /// Resolve relative paths and the executable against `dir` instead of
    /// the running executable's directory.
    pub fn base_directory(mut self, dir: PathBuf) -> Self {
        self.base_directory = Some(dir);
        self
    }

    /// Engine used to build the node in embedded mode. Required there,
    /// ignored for a separate process.
    pub fn engine(mut self, engine: Arc<dyn EmbeddedEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Start the configured server.
    ///
    /// Configuration problems, a missing executable and embedded engine
    /// failures are returned here. A separate process is spawned on a
    /// background task; without a start timeout its failures only show up
    /// through [`Runner::process_state`].
    #[tracing::instrument(skip(self), fields(embedded = self.options.use_embedded()))]
    pub async fn start(self) -> Result<Runner> {
        let base_directory = match self.base_directory {
            Some(dir) => dir,
            None => paths::default_base_directory()?,
        };
        let options = self.options;

        let server: Box<dyn ServerInstance> = if options.use_embedded() {
            let engine = self.engine.ok_or_else(|| {
                Error::Config(
                    "Embedded mode needs an EmbeddedEngine; pass one with RunnerBuilder::engine"
                        .to_string(),
                )
            })?;
            let storage = if options.run_in_memory() {
                StorageMode::InMemory
            } else {
                StorageMode::OnDisk(required_data_path(&base_directory, &options)?)
            };
            let server = EmbeddedServer::start(
                engine.as_ref(),
                NodeConfig::single_node(storage),
                options.start_timeout(),
            )
            .await?;
            Box::new(server)
        } else {
            let executable = paths::locate_executable(&base_directory)?;
            let data_dir = required_data_path(&base_directory, &options)?;
            let spec = ProcessSpec::new(
                executable,
                vec![paths::db_argument(&data_dir)],
                base_directory.clone(),
                options.output(),
            );
            let mut server = ProcessServer::spawn(spec);
            if let Some(timeout) = options.start_timeout() {
                if let Err(e) = server.wait_until_running(timeout).await {
                    if let Err(stop_err) = server.stop().await {
                        tracing::warn!("Cleanup after failed start: {}", stop_err);
                    }
                    return Err(e);
                }
            }
            Box::new(server)
        };

        let kind = server.kind();
        let process_state = server.process_state();
        tracing::info!(
            "Started {} EventStore server (base directory: {})",
            kind,
            base_directory.display()
        );

        Ok(Runner {
            options,
            base_directory,
            kind,
            server: tokio::sync::Mutex::new(Some(server)),
            process_state,
            stopped: AtomicBool::new(false),
            purged: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_in_memory_has_no_data_path() {
        let options = RunnerOptions::builder().embedded().purge_data().build();
        assert_eq!(data_path(Path::new("/opt/app"), &options), None);
    }

    #[test]
    fn empty_directory_is_a_config_error() {
        let options = RunnerOptions::builder().full_server().build();
        let err = required_data_path(Path::new("base"), &options).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn start_and_purge_resolve_identically() {
        let options = RunnerOptions::builder()
            .full_server()
            .data_directory("nested/data")
            .build();
        let base = Path::new("base");
        assert_eq!(
            required_data_path(base, &options).unwrap(),
            paths::resolve_data_directory(base, "nested/data")
        );
        assert_eq!(
            data_path(base, &options),
            Some(base.join("nested").join("data"))
        );
    }
}
