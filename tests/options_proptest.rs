//! Property tests for option building and path resolution.

use eventstore_runner::options::DEFAULT_DATA_DIRECTORY;
use eventstore_runner::paths::resolve_data_directory;
use eventstore_runner::{OutputMode, RunnerOptions};
use proptest::prelude::*;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Embedded,
    FullServer,
    RunInMemory,
    RunOnDisk,
    DataDirectory(String),
    PurgeData,
    StartTimeout(u64),
    Output(OutputMode),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Embedded),
        Just(Op::FullServer),
        Just(Op::RunInMemory),
        Just(Op::RunOnDisk),
        "[a-z/]{0,12}".prop_map(Op::DataDirectory),
        Just(Op::PurgeData),
        (1u64..60_000).prop_map(Op::StartTimeout),
        prop_oneof![
            Just(OutputMode::Passthrough),
            Just(OutputMode::Log),
            Just(OutputMode::Null)
        ]
        .prop_map(Op::Output),
    ]
}

/// Plain-struct model of what the builder should end up with.
#[derive(Debug, Default)]
struct Model {
    embedded: bool,
    in_memory: bool,
    data_directory: String,
    purge: bool,
    start_timeout: Option<Duration>,
    output: OutputMode,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Embedded => {
                self.embedded = true;
                self.in_memory = true;
                self.data_directory = DEFAULT_DATA_DIRECTORY.to_string();
            }
            Op::FullServer => self.embedded = false,
            Op::RunInMemory => self.in_memory = true,
            Op::RunOnDisk => self.in_memory = false,
            Op::DataDirectory(dir) => self.data_directory = dir.clone(),
            Op::PurgeData => self.purge = true,
            Op::StartTimeout(ms) => self.start_timeout = Some(Duration::from_millis(*ms)),
            Op::Output(mode) => self.output = *mode,
        }
    }
}

proptest! {
    #[test]
    fn build_reflects_setters_in_order(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let mut builder = RunnerOptions::builder();
        let mut model = Model::default();
        for op in &ops {
            model.apply(op);
            builder = match op {
                Op::Embedded => builder.embedded(),
                Op::FullServer => builder.full_server(),
                Op::RunInMemory => builder.run_in_memory(),
                Op::RunOnDisk => builder.run_on_disk(),
                Op::DataDirectory(dir) => builder.data_directory(dir.clone()),
                Op::PurgeData => builder.purge_data(),
                Op::StartTimeout(ms) => builder.start_timeout(Duration::from_millis(*ms)),
                Op::Output(mode) => builder.output(*mode),
            };
        }

        let options = builder.build();
        prop_assert_eq!(options.use_embedded(), model.embedded);
        prop_assert_eq!(options.run_in_memory(), model.in_memory);
        prop_assert_eq!(options.data_directory(), model.data_directory.as_str());
        prop_assert_eq!(options.purge_data(), model.purge);
        prop_assert_eq!(options.start_timeout(), model.start_timeout);
        prop_assert_eq!(options.output(), model.output);
        prop_assert_eq!(options.is_pure_in_memory(), model.embedded && model.in_memory);
    }

    #[test]
    fn build_is_repeatable(ops in prop::collection::vec(op_strategy(), 0..8)) {
        let mut builder = RunnerOptions::builder();
        for op in &ops {
            builder = match op {
                Op::Embedded => builder.embedded(),
                Op::FullServer => builder.full_server(),
                Op::RunInMemory => builder.run_in_memory(),
                Op::RunOnDisk => builder.run_on_disk(),
                Op::DataDirectory(dir) => builder.data_directory(dir.clone()),
                Op::PurgeData => builder.purge_data(),
                Op::StartTimeout(ms) => builder.start_timeout(Duration::from_millis(*ms)),
                Op::Output(mode) => builder.output(*mode),
            };
        }
        prop_assert_eq!(builder.build(), builder.build());
    }

    #[cfg(unix)]
    #[test]
    fn resolution_is_idempotent(relative in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let base = Path::new("/opt/app");
        let once = resolve_data_directory(base, &relative);
        prop_assert!(once.starts_with(base));

        let twice = resolve_data_directory(base, once.to_str().unwrap());
        prop_assert_eq!(&once, &twice);
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_unchanged(tail in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let absolute = format!("/{}", tail);
        let resolved = resolve_data_directory(Path::new("/opt/app"), &absolute);
        prop_assert_eq!(resolved, Path::new(&absolute).to_path_buf());
    }
}
