use super::apply_overrides;
use crate::cli::OptionOverrides;
use crate::output::UserOutput;
use eventstore_runner::paths::{executable_path, resolve_data_directory};
use eventstore_runner::RunnerOptionsBuilder;
use std::path::Path;

pub fn run_paths(
    builder: RunnerOptionsBuilder,
    overrides: &OptionOverrides,
    base_dir: &Path,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let options = apply_overrides(builder, overrides).build();

    out.status(&format!("Base directory: {}", base_dir.display()));

    let exe = executable_path(base_dir);
    let found = if exe.is_file() { "found" } else { "missing" };
    out.status(&format!("Executable:     {} ({})", exe.display(), found));

    if options.data_directory().is_empty() {
        out.status("Data directory: (not configured)");
    } else {
        let dir = resolve_data_directory(base_dir, options.data_directory());
        let exists = if dir.is_dir() { "exists" } else { "absent" };
        out.status(&format!("Data directory: {} ({})", dir.display(), exists));
    }
    Ok(())
}
