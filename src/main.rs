mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use eventstore_runner::options::{Parser as OptionsParser, RunnerOptionsBuilder};
use eventstore_runner::Error as RunnerError;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(runner_error) = e.downcast_ref::<RunnerError>() {
            eprintln!("Error: {}", runner_error);
            if let Some(suggestion) = runner_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let builder = load_options(cli.config.as_ref())?;
    let base_dir = resolve_base_dir(cli.base_dir)?;

    match cli.command {
        Commands::Run {
            overrides,
            purge,
            start_timeout,
            output: output_mode,
        } => {
            commands::run_server(
                builder,
                &overrides,
                purge,
                start_timeout.as_deref(),
                output_mode.as_deref(),
                base_dir,
                &output::CliOutput,
            )
            .await
        }
        Commands::Purge { overrides } => {
            commands::run_purge(builder, &overrides, &base_dir, &output::CliOutput)
        }
        Commands::Paths { overrides } => {
            commands::run_paths(builder, &overrides, &base_dir, &output::CliOutput)
        }
    }
}

/// Options from an explicit file, a discovered file, or the zero state.
fn load_options(explicit: Option<&PathBuf>) -> anyhow::Result<RunnerOptionsBuilder> {
    let parser = OptionsParser::new();
    let path = match explicit {
        Some(path) => Some(path.clone()),
        None => parser.find_config_file().ok(),
    };

    match path {
        Some(path) => {
            tracing::debug!("Loading options from {}", path.display());
            Ok(parser.load_config(&path)?.into_builder())
        }
        None => Ok(RunnerOptionsBuilder::new()),
    }
}

fn resolve_base_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => Ok(eventstore_runner::paths::default_base_directory()?),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
