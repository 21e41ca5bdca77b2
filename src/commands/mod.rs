mod paths;
mod purge;
mod run;

pub use paths::run_paths;
pub use purge::run_purge;
pub use run::run_server;

use crate::cli::OptionOverrides;
use eventstore_runner::RunnerOptionsBuilder;

/// Command-line flags win over the options file.
fn apply_overrides(mut builder: RunnerOptionsBuilder, overrides: &OptionOverrides) -> RunnerOptionsBuilder {
    if let Some(ref dir) = overrides.data_dir {
        builder = builder.data_directory(dir.clone());
    }
    builder
}
