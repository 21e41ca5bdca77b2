//! Shared fixtures: a scriptable embedded engine and fake server binaries.

#![allow(dead_code)]

use async_trait::async_trait;
use eventstore_runner::engine::{EmbeddedEngine, EmbeddedNode, NodeConfig, StorageMode};
use eventstore_runner::{Error, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters shared between an engine and every node it builds.
#[derive(Default)]
pub struct NodeEvents {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl NodeEvents {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// How the mock node reports readiness.
#[derive(Clone, Copy)]
pub enum Readiness {
    Immediate,
    After(Duration),
    Never,
}

pub struct MockEngine {
    pub built: Mutex<Vec<NodeConfig>>,
    pub events: Arc<NodeEvents>,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub readiness: Readiness,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            built: Mutex::new(Vec::new()),
            events: Arc::new(NodeEvents::default()),
            fail_start: false,
            fail_stop: false,
            readiness: Readiness::Immediate,
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    pub fn failing_stop() -> Self {
        Self {
            fail_stop: true,
            ..Self::new()
        }
    }

    pub fn with_readiness(readiness: Readiness) -> Self {
        Self {
            readiness,
            ..Self::new()
        }
    }

    pub fn last_config(&self) -> Option<NodeConfig> {
        self.built.lock().last().cloned()
    }
}

#[async_trait]
impl EmbeddedEngine for MockEngine {
    async fn build(&self, config: NodeConfig) -> Result<Box<dyn EmbeddedNode>> {
        self.built.lock().push(config.clone());
        Ok(Box::new(MockNode {
            storage: config.storage,
            events: Arc::clone(&self.events),
            fail_start: self.fail_start,
            fail_stop: self.fail_stop,
            readiness: self.readiness,
            started_at: None,
        }))
    }
}

pub struct MockNode {
    storage: StorageMode,
    events: Arc<NodeEvents>,
    fail_start: bool,
    fail_stop: bool,
    readiness: Readiness,
    started_at: Option<Instant>,
}

#[async_trait]
impl EmbeddedNode for MockNode {
    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(Error::Engine("database files are locked".to_string()));
        }
        // Behave like a disk-backed engine: the first write creates the directory.
        if let StorageMode::OnDisk(ref path) = self.storage {
            std::fs::create_dir_all(path.join("index"))?;
            std::fs::write(path.join("chunk-000000.000000"), b"chunk")?;
        }
        self.started_at = Some(Instant::now());
        self.events.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.events.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(Error::Engine("node refused to shut down".to_string()));
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        match (self.readiness, self.started_at) {
            (Readiness::Immediate, _) => true,
            (Readiness::After(delay), Some(started)) => started.elapsed() >= delay,
            _ => false,
        }
    }
}

/// Path of the fake server binary under `base`.
pub fn server_path(base: &Path) -> PathBuf {
    eventstore_runner::paths::executable_path(base)
}

/// Install a shell script as the server binary under `base`.
#[cfg(unix)]
pub fn install_fake_server(base: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = server_path(base);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A server that creates its data directory, records its arguments in
/// `args.txt` in its working directory, then runs until killed.
#[cfg(unix)]
pub fn install_recording_server(base: &Path) -> PathBuf {
    install_fake_server(
        base,
        r#"db="${1#--db=}"
mkdir -p "$db"
echo data > "$db/chunk-000000.000000"
printf '%s\n' "$@" > args.txt.tmp && mv args.txt.tmp args.txt
exec sleep 30"#,
    )
}

/// True if a process with this PID exists. Signal 0 checks without
/// delivering anything; EPERM still means the process is there.
#[cfg(unix)]
pub fn pid_is_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;

    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }
    match signal::kill(Pid::from_raw(pid as i32), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Poll until `path` exists, panicking after five seconds.
pub async fn wait_for_file(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !path.exists() {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {}",
            path.display()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
