//! Filesystem conventions shared by start and purge.
//!
//! Every path the runner touches is derived from one base directory, which
//! defaults to the directory holding the running executable. Start and purge
//! both go through [`resolve_data_directory`], so the directory that gets
//! deleted is always the one the server stored its data in.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the base directory that holds the server binaries.
pub const BINARIES_DIR: &str = "EventStoreBinaries";

/// File name of the server executable inside [`BINARIES_DIR`].
#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "EventStore.ClusterNode.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "EventStore.ClusterNode";

/// Directory containing the running executable.
pub fn default_base_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        Error::Config(format!(
            "Executable path '{}' has no parent directory",
            exe.display()
        ))
    })
}

/// Resolve a configured data directory against the base directory.
///
/// Rooted paths are returned unchanged, everything else is joined onto
/// `base`. Applying it to its own output returns the same path.
pub fn resolve_data_directory(base: &Path, data_directory: &str) -> PathBuf {
    let configured = Path::new(data_directory);
    if configured.has_root() {
        configured.to_path_buf()
    } else {
        base.join(configured)
    }
}

/// Where the server executable is expected to live.
pub fn executable_path(base: &Path) -> PathBuf {
    base.join(BINARIES_DIR).join(EXECUTABLE_NAME)
}

/// Return the executable path, or [`Error::MissingExecutable`] if nothing is there.
pub fn locate_executable(base: &Path) -> Result<PathBuf> {
    let path = executable_path(base);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::MissingExecutable { path })
    }
}

/// The single argument handed to the server process.
///
/// Built from the raw OS string so the server stores into exactly the
/// directory that purge later deletes, even when the path is not UTF-8.
pub fn db_argument(resolved: &Path) -> OsString {
    let mut arg = OsString::from("--db=");
    arg.push(resolved.as_os_str());
    arg
}

/// Recursively delete a data directory.
///
/// Returns `Ok(false)` if there was nothing to delete.
pub fn purge_directory(path: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!("Purged data directory {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Data directory {} already absent", path.display());
            Ok(false)
        }
        Err(source) => Err(Error::Purge {
            path: path.to_path_buf(),
            source,
        }),
    }
}
