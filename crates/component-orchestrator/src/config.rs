//! # Orchestrator Configuration
//!
//! [`OrchestratorConfig`] collects the runtime limits of an orchestrator instance.
//! Values start from [`Default`], can be overridden with the `with_*` builders, and
//! [`OrchestratorConfig::from_env`] layers environment variables on top:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ORCHESTRATOR_CAPACITY` | `capacity` | 1000 |
//! | `ORCHESTRATOR_MAX_DEPTH` | `max_dependency_depth` | 10 |
//! | `ORCHESTRATOR_HOOK_TIMEOUT_MS` | `hook_timeout` | none |
//! | `ORCHESTRATOR_CHANNEL_BUFFER` | `channel_buffer` | 32 |

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::graph::DEFAULT_MAX_DEPTH;
use crate::registry::DEFAULT_CAPACITY;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_CAPACITY: &str = "ORCHESTRATOR_CAPACITY";
pub const ENV_MAX_DEPTH: &str = "ORCHESTRATOR_MAX_DEPTH";
pub const ENV_HOOK_TIMEOUT_MS: &str = "ORCHESTRATOR_HOOK_TIMEOUT_MS";
pub const ENV_CHANNEL_BUFFER: &str = "ORCHESTRATOR_CHANNEL_BUFFER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of registered components.
    pub capacity: usize,
    /// Node budget of the cycle guard's walk.
    pub max_dependency_depth: usize,
    /// Per start/stop hook limit. `None` waits forever.
    pub hook_timeout: Option<Duration>,
    /// Capacity of the registry actor's request channel.
    pub channel_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_dependency_depth: DEFAULT_MAX_DEPTH,
            hook_timeout: None,
            channel_buffer: 32,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_dependency_depth(mut self, depth: usize) -> Self {
        self.max_dependency_depth = depth;
        self
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = Some(timeout);
        self
    }

    pub fn with_channel_buffer(mut self, buffer: usize) -> Self {
        self.channel_buffer = buffer;
        self
    }

    /// Defaults overridden by any `ORCHESTRATOR_*` variables that are set.
    pub fn from_env() -> OrchestratorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrchestratorResult<Self> {
        let mut config = Self::default();
        if let Some(capacity) = parse(&lookup, ENV_CAPACITY)? {
            config.capacity = capacity;
        }
        if let Some(depth) = parse(&lookup, ENV_MAX_DEPTH)? {
            config.max_dependency_depth = depth;
        }
        if let Some(ms) = parse::<u64>(&lookup, ENV_HOOK_TIMEOUT_MS)? {
            config.hook_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(buffer) = parse(&lookup, ENV_CHANNEL_BUFFER)? {
            config.channel_buffer = buffer;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.capacity == 0 {
            return Err(OrchestratorError::Config("capacity must be at least 1".into()));
        }
        if self.max_dependency_depth == 0 {
            // the cycle guard would refuse every edge
            return Err(OrchestratorError::Config("max_dependency_depth must be at least 1".into()));
        }
        if self.channel_buffer == 0 {
            // tokio::sync::mpsc::channel panics on a zero buffer
            return Err(OrchestratorError::Config("channel_buffer must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> OrchestratorResult<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OrchestratorError::Config(format!("{key}: cannot parse {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_limits() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.max_dependency_depth, 10);
        assert_eq!(config.hook_timeout, None);
        assert_eq!(config.channel_buffer, 32);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = OrchestratorConfig::from_lookup(lookup(&[
            (ENV_CAPACITY, "5"),
            (ENV_HOOK_TIMEOUT_MS, "250"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.max_dependency_depth, 10);
        assert_eq!(config.hook_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = OrchestratorConfig::from_lookup(lookup(&[(ENV_MAX_DEPTH, "deep")])).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(msg) if msg.contains(ENV_MAX_DEPTH)));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let err = OrchestratorConfig::from_lookup(lookup(&[(ENV_CAPACITY, "0")])).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }

    #[test]
    fn zero_depth_is_invalid() {
        let err = OrchestratorConfig::from_lookup(lookup(&[(ENV_MAX_DEPTH, "0")])).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(msg) if msg.contains("max_dependency_depth")));

        let config = OrchestratorConfig::default().with_max_dependency_depth(0);
        assert!(config.validate().is_err());
        assert!(config.with_max_dependency_depth(1).validate().is_ok());
    }
}
