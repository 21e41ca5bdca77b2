use super::apply_overrides;
use crate::cli::OptionOverrides;
use crate::output::UserOutput;
use eventstore_runner::options::parse_duration;
use eventstore_runner::{Error, OutputMode, ProcessState, Runner, RunnerOptionsBuilder};
use std::path::PathBuf;

/// Run the server as a separate process in the foreground.
///
/// Returns once the server exits on its own or Ctrl-C is pressed; either way
/// the runner is stopped (and purged, if asked) before returning.
pub async fn run_server(
    builder: RunnerOptionsBuilder,
    overrides: &OptionOverrides,
    purge: bool,
    start_timeout: Option<&str>,
    output_mode: Option<&str>,
    base_dir: PathBuf,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let mut builder = apply_overrides(builder, overrides).full_server();
    if purge {
        builder = builder.purge_data();
    }
    if let Some(timeout) = start_timeout {
        builder = builder.start_timeout(parse_duration(timeout)?);
    }
    if let Some(mode) = output_mode {
        builder = builder.output(mode.parse::<OutputMode>()?);
    }
    let options = builder.build();

    let runner = Runner::builder(options)
        .base_directory(base_dir)
        .start()
        .await?;

    match runner.pid() {
        Some(pid) => out.success(&format!("EventStore server started (PID {})", pid)),
        None => out.success("EventStore server starting"),
    }
    if let Some(dir) = runner.data_directory() {
        out.status(&format!("Data directory: {}", dir.display()));
    }
    out.status("Press Ctrl-C to stop");

    let exit = tokio::select! {
        state = runner.wait_for_exit() => state,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                out.warning(&format!("Failed to listen for Ctrl-C: {}", e));
            }
            out.blank();
            out.status("Stopping EventStore server...");
            None
        }
    };

    runner.stop().await?;
    if runner.purged() {
        out.status("Data directory purged");
    } else if runner.options().purge_data() {
        out.status("No data directory to purge");
    }

    match exit {
        None | Some(ProcessState::Killed) => {
            out.success("EventStore server stopped");
            Ok(())
        }
        Some(ProcessState::Exited { code: Some(0) }) => {
            out.success("EventStore server exited");
            Ok(())
        }
        Some(ProcessState::Failed { reason }) => Err(Error::ServerStartFailed(reason).into()),
        Some(other) => anyhow::bail!("EventStore server {}", other),
    }
}
