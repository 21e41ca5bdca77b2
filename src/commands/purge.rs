use super::apply_overrides;
use crate::cli::OptionOverrides;
use crate::output::UserOutput;
use eventstore_runner::paths::{purge_directory, resolve_data_directory};
use eventstore_runner::{Error, RunnerOptionsBuilder};
use std::path::Path;

/// Delete the data directory the server would use.
///
/// Only safe while no server is running on it; nothing here checks that.
pub fn run_purge(
    builder: RunnerOptionsBuilder,
    overrides: &OptionOverrides,
    base_dir: &Path,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let options = apply_overrides(builder, overrides).build();
    if options.data_directory().is_empty() {
        return Err(Error::Config("No data directory configured to purge".to_string()).into());
    }

    let path = resolve_data_directory(base_dir, options.data_directory());
    if purge_directory(&path)? {
        out.success(&format!("Purged {}", path.display()));
    } else {
        out.status(&format!("Nothing to purge at {}", path.display()));
    }
    Ok(())
}
