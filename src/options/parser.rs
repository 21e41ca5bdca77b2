use super::{OutputMode, RunnerOptionsBuilder};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File names searched for, in order, by [`Parser::find_config_file`].
pub const CONFIG_FILE_NAMES: [&str; 2] = ["eventstore-runner.yaml", "eventstore-runner.yml"];

/// On-disk form of the runner options.
///
/// ```yaml
/// embedded: false
/// data_directory: data
/// purge_data: true
/// start_timeout: 30s
/// output: log
/// ```
///
/// Absent keys keep the builder's zero state, so an empty file describes a
/// disk-backed separate server with no data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsFile {
    pub embedded: bool,
    /// Defaults to in-memory for an embedded node, on-disk otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_in_memory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_directory: Option<String>,
    pub purge_data: bool,
    #[serde(
        with = "super::duration::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_timeout: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
}

impl OptionsFile {
    /// Replay the file's settings onto a builder, in the same order a caller
    /// would: mode first so an explicit data directory overrides the
    /// embedded default.
    pub fn into_builder(self) -> RunnerOptionsBuilder {
        let mut builder = RunnerOptionsBuilder::new();
        if self.embedded {
            builder = builder.embedded();
        }
        match self.run_in_memory {
            Some(true) => builder = builder.run_in_memory(),
            Some(false) => builder = builder.run_on_disk(),
            None => {}
        }
        if let Some(dir) = self.data_directory {
            builder = builder.data_directory(dir);
        }
        if self.purge_data {
            builder = builder.purge_data();
        }
        if let Some(timeout) = self.start_timeout {
            builder = builder.start_timeout(timeout);
        }
        if let Some(output) = self.output {
            builder = builder.output(output);
        }
        builder
    }
}

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find an options file starting from the current directory.
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(
            "Could not find eventstore-runner.yaml in current directory or any parent".to_string(),
        ))
    }

    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<OptionsFile> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read options file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_config(&content)
    }

    pub fn parse_config(&self, content: &str) -> Result<OptionsFile> {
        if content.trim().is_empty() {
            return Ok(OptionsFile::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let yaml = r#"
embedded: false
data_directory: /var/lib/eventstore
purge_data: true
start_timeout: 30s
output: log
"#;
        let file = Parser::new().parse_config(yaml).unwrap();
        let options = file.into_builder().build();

        assert!(!options.use_embedded());
        assert_eq!(options.data_directory(), "/var/lib/eventstore");
        assert!(options.purge_data());
        assert_eq!(options.start_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(options.output(), OutputMode::Log);
    }

    #[test]
    fn embedded_file_keeps_default_directory() {
        let file = Parser::new().parse_config("embedded: true\n").unwrap();
        let options = file.into_builder().build();
        assert!(options.use_embedded());
        assert!(options.run_in_memory());
        assert_eq!(options.data_directory(), "data");
    }

    #[test]
    fn embedded_file_can_go_on_disk() {
        let yaml = "embedded: true\nrun_in_memory: false\ndata_directory: db\n";
        let options = Parser::new().parse_config(yaml).unwrap().into_builder().build();
        assert!(options.use_embedded());
        assert!(!options.run_in_memory());
        assert_eq!(options.data_directory(), "db");
    }

    #[test]
    fn empty_file_is_zero_state() {
        let file = Parser::new().parse_config("   \n").unwrap();
        assert_eq!(file, OptionsFile::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_durations() {
        let parser = Parser::new();
        assert!(matches!(
            parser.parse_config("purge: true\n"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            parser.parse_config("start_timeout: soon\n"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn finds_file_in_parent_directory() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("eventstore-runner.yml"), "purge_data: true\n").unwrap();

        let found = Parser::find_config_in_dir(&nested).unwrap();
        assert_eq!(found, temp.path().join("eventstore-runner.yml"));
    }
}
