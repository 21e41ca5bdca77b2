//! Runner configuration.
//!
//! - `builder` - [`RunnerOptions`] and its fluent [`RunnerOptionsBuilder`]
//! - `duration` - human-readable start timeouts
//! - `parser` - optional YAML options file

mod builder;
mod duration;
mod parser;

pub use builder::*;
pub use duration::{format_duration, parse_duration};
pub use parser::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens to the separate server process's stdout/stderr.
///
/// Ignored on the embedded path, which shares the host's own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Inherit the host's console, the way a normally windowed child would show output.
    #[default]
    Passthrough,

    /// Pipe both streams and forward each line to `tracing` at info level.
    Log,

    /// Discard all output.
    Null,
}

impl OutputMode {
    /// Returns true if output lines are forwarded to the log.
    pub fn is_log(&self) -> bool {
        matches!(self, OutputMode::Log)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Passthrough => write!(f, "passthrough"),
            OutputMode::Log => write!(f, "log"),
            OutputMode::Null => write!(f, "null"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "inherit" => Ok(OutputMode::Passthrough),
            "log" => Ok(OutputMode::Log),
            "null" | "none" => Ok(OutputMode::Null),
            other => Err(crate::Error::Parse(format!(
                "Unknown output mode '{}': expected passthrough, log or null",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_parses_aliases() {
        assert_eq!("inherit".parse::<OutputMode>().unwrap(), OutputMode::Passthrough);
        assert_eq!("LOG".parse::<OutputMode>().unwrap(), OutputMode::Log);
        assert_eq!("none".parse::<OutputMode>().unwrap(), OutputMode::Null);
        assert!("file".parse::<OutputMode>().is_err());
    }

    #[test]
    fn output_mode_display_round_trips() {
        for mode in [OutputMode::Passthrough, OutputMode::Log, OutputMode::Null] {
            assert_eq!(mode.to_string().parse::<OutputMode>().unwrap(), mode);
        }
    }
}
