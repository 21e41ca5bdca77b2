//! Human-readable durations for start timeouts.
//!
//! Accepts `"500ms"`, `"30s"`, `"2m"` or a bare number of seconds.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Parse a duration string like `"10s"`, `"1m"`, `"500ms"`.
///
/// # Examples
///
/// ```
/// use eventstore_runner::options::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
/// assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let trimmed = s.trim();
    let invalid = || Error::Parse(format!("Invalid duration '{}': expected e.g. 500ms, 30s, 2m", s));

    if trimmed.is_empty() {
        return Err(invalid());
    }

    // Bare numbers are seconds.
    let (digits, millis_per_unit) = if let Some(n) = trimmed.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = trimmed.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 60_000)
    } else {
        (trimmed, 1_000)
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|v| v.checked_mul(millis_per_unit))
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}

/// Render a duration in the shortest unit that represents it exactly.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis % 60_000 == 0 && millis > 0 {
        format!("{}m", millis / 60_000)
    } else if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

/// Serde adapter for `Option<Duration>` fields written as duration strings.
pub(crate) mod optional {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&format_duration(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
