use super::OutputMode;
use std::time::Duration;

/// Data directory used by [`RunnerOptionsBuilder::embedded`].
pub const DEFAULT_DATA_DIRECTORY: &str = "data";

/// How a [`Runner`](crate::Runner) should run the server.
///
/// Immutable once built. Nothing here is validated until the runner starts,
/// so any combination can be expressed; unusable ones fail with
/// [`Error::Config`](crate::Error::Config) at start time.
///
/// # Example
///
/// ```
/// use eventstore_runner::RunnerOptions;
///
/// let options = RunnerOptions::builder().embedded().build();
/// assert!(options.use_embedded());
/// assert!(options.run_in_memory());
/// assert_eq!(options.data_directory(), "data");
/// assert!(!options.purge_data());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    use_embedded: bool,
    run_in_memory: bool,
    data_directory: String,
    purge_data: bool,
    start_timeout: Option<Duration>,
    output: OutputMode,
}

impl RunnerOptions {
    pub fn builder() -> RunnerOptionsBuilder {
        RunnerOptionsBuilder::new()
    }

    /// Run the node inside this process instead of spawning the server binary.
    pub fn use_embedded(&self) -> bool {
        self.use_embedded
    }

    /// Memory-backed storage. Only meaningful for the embedded node.
    pub fn run_in_memory(&self) -> bool {
        self.run_in_memory
    }

    pub fn data_directory(&self) -> &str {
        &self.data_directory
    }

    /// Delete the data directory once the server has stopped.
    pub fn purge_data(&self) -> bool {
        self.purge_data
    }

    pub fn start_timeout(&self) -> Option<Duration> {
        self.start_timeout
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    /// True when the server never touches the data directory.
    pub fn is_pure_in_memory(&self) -> bool {
        self.use_embedded && self.run_in_memory
    }
}

/// Fluent builder for [`RunnerOptions`].
///
/// Setters only record intent; the last call for a field wins.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptionsBuilder {
    use_embedded: bool,
    run_in_memory: bool,
    data_directory: String,
    purge_data: bool,
    start_timeout: Option<Duration>,
    output: OutputMode,
}

impl RunnerOptionsBuilder {
    /// Create a builder in the zero state: separate process, on disk,
    /// no data directory, no purge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run an embedded in-memory node with the default data directory.
    pub fn embedded(mut self) -> Self {
        self.use_embedded = true;
        self.run_in_memory = true;
        self.data_directory = DEFAULT_DATA_DIRECTORY.to_string();
        self
    }

    /// Run the server as a separate process.
    pub fn full_server(mut self) -> Self {
        self.use_embedded = false;
        self
    }

    pub fn run_in_memory(mut self) -> Self {
        self.run_in_memory = true;
        self
    }

    /// Disk-backed storage under the data directory.
    pub fn run_on_disk(mut self) -> Self {
        self.run_in_memory = false;
        self
    }

    /// Relative paths are resolved against the runner's base directory.
    pub fn data_directory(mut self, path: impl Into<String>) -> Self {
        self.data_directory = path.into();
        self
    }

    pub fn purge_data(mut self) -> Self {
        self.purge_data = true;
        self
    }

    /// Wait at most `timeout` for the server to come up when starting.
    ///
    /// Without a timeout, start returns as soon as the server has been
    /// launched and readiness is not checked.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = Some(timeout);
        self
    }

    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    pub fn build(&self) -> RunnerOptions {
        RunnerOptions {
            use_embedded: self.use_embedded,
            run_in_memory: self.run_in_memory,
            data_directory: self.data_directory.clone(),
            purge_data: self.purge_data,
            start_timeout: self.start_timeout,
            output: self.output,
        }
    }
}
