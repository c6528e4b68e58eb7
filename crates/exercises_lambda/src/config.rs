use std::path::PathBuf;
use std::time::Duration;

use exercises_core::fetch::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_TODO_URL};
use exercises_core::scheduling::SchedulingConfig;
use thiserror::Error;

pub const TODO_ENDPOINT_URL: &str = "TODO_ENDPOINT_URL";
pub const TODO_REQUEST_TIMEOUT_MS: &str = "TODO_REQUEST_TIMEOUT_MS";
pub const SCHEDULING_TIMER_DELAY_MS: &str = "SCHEDULING_TIMER_DELAY_MS";
pub const SCHEDULING_WAIT_FOR_PENDING: &str = "SCHEDULING_WAIT_FOR_PENDING";
pub const SCHEDULING_READ_PATH: &str = "SCHEDULING_READ_PATH";
pub const CONNECT_LATENCY_MS: &str = "CONNECT_LATENCY_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Settings read once per process, during the init phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub todo_endpoint_url: String,
    pub todo_request_timeout: Duration,
    pub scheduling: SchedulingConfig,
    pub connect_latency: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SchedulingConfig::default();
        let scheduling = SchedulingConfig {
            timer_delay: parse_millis(&lookup, SCHEDULING_TIMER_DELAY_MS)?
                .unwrap_or(defaults.timer_delay),
            wait_for_pending_tasks: parse_flag(&lookup, SCHEDULING_WAIT_FOR_PENDING)?
                .unwrap_or(defaults.wait_for_pending_tasks),
            read_path: non_empty(&lookup, SCHEDULING_READ_PATH).map(PathBuf::from),
        };

        Ok(Self {
            todo_endpoint_url: non_empty(&lookup, TODO_ENDPOINT_URL)
                .unwrap_or_else(|| DEFAULT_TODO_URL.to_string()),
            todo_request_timeout: parse_millis(&lookup, TODO_REQUEST_TIMEOUT_MS)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            scheduling,
            connect_latency: parse_millis(&lookup, CONNECT_LATENCY_MS)?.unwrap_or_default(),
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = non_empty(lookup, key) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|_| ConfigError {
            key,
            value: raw,
            expected: "a non-negative integer of milliseconds",
        })
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = non_empty(lookup, key) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError {
            key,
            value: raw,
            expected: "one of true, false, 1, 0, yes, no",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RuntimeConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults should load");

        assert_eq!(config.todo_endpoint_url, DEFAULT_TODO_URL);
        assert_eq!(config.todo_request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.scheduling, SchedulingConfig::default());
        assert_eq!(config.connect_latency, Duration::ZERO);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (TODO_ENDPOINT_URL, "http://localhost:8080/todos/7"),
            (SCHEDULING_TIMER_DELAY_MS, "250"),
            (SCHEDULING_WAIT_FOR_PENDING, "No"),
            (SCHEDULING_READ_PATH, "/var/task/bootstrap"),
            (CONNECT_LATENCY_MS, " 15 "),
        ])
        .expect("overrides should load");

        assert_eq!(config.todo_endpoint_url, "http://localhost:8080/todos/7");
        assert_eq!(config.scheduling.timer_delay, Duration::from_millis(250));
        assert!(!config.scheduling.wait_for_pending_tasks);
        assert_eq!(
            config.scheduling.read_path,
            Some(PathBuf::from("/var/task/bootstrap"))
        );
        assert_eq!(config.connect_latency, Duration::from_millis(15));
    }

    #[test]
    fn rejects_malformed_values() {
        let error = config_from(&[(TODO_REQUEST_TIMEOUT_MS, "soon")])
            .expect_err("non-numeric timeout should fail");
        assert_eq!(error.key, TODO_REQUEST_TIMEOUT_MS);

        let error = config_from(&[(SCHEDULING_WAIT_FOR_PENDING, "maybe")])
            .expect_err("unknown flag should fail");
        assert_eq!(
            error.to_string(),
            "SCHEDULING_WAIT_FOR_PENDING must be one of true, false, 1, 0, yes, no, got 'maybe'"
        );
    }
}
