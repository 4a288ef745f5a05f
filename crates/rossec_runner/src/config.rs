use std::env;
use std::time::Duration;

use rossec_core::error::{CoreError, Domain, ErrorKind, Payload, Result};

use crate::wait::DEFAULT_POLL_SLICE;

pub const DEFAULT_TARGET_NODE: &str = "noop";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub const ENV_TARGET_NODE: &str = "ROSSEC_TARGET_NODE";
pub const ENV_TIMEOUT_MS: &str = "ROSSEC_TIMEOUT_MS";
pub const ENV_POLL_SLICE_MS: &str = "ROSSEC_POLL_SLICE_MS";

/// Settings for one lifecycle client.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunnerConfig {
    /// Name of the managed node to drive (no leading slash).
    pub target_node: String,
    /// Budget used by `configure()`/`activate()`/... .
    pub default_timeout: Duration,
    /// Granularity of the bounded wait.
    pub poll_slice: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target_node: DEFAULT_TARGET_NODE.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            poll_slice: DEFAULT_POLL_SLICE,
        }
    }
}

impl RunnerConfig {
    pub fn new(target_node: impl Into<String>) -> Self {
        Self {
            target_node: target_node.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ROSSEC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Same as [`RunnerConfig::from_env`], reading from `vars` instead.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                ENV_TARGET_NODE => config.target_node = value.to_string(),
                ENV_TIMEOUT_MS => config.default_timeout = parse_millis(ENV_TIMEOUT_MS, value)?,
                ENV_POLL_SLICE_MS => config.poll_slice = parse_millis(ENV_POLL_SLICE_MS, value)?,
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_poll_slice(mut self, slice: Duration) -> Self {
        self.poll_slice = slice;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_node.is_empty() {
            return Err(config_error("target node name must not be empty", ENV_TARGET_NODE));
        }
        if self.target_node.starts_with('/') {
            return Err(config_error(
                "target node name must not start with '/'",
                ENV_TARGET_NODE,
            ));
        }
        if self.poll_slice.is_zero() {
            return Err(config_error("poll slice must be positive", ENV_POLL_SLICE_MS));
        }
        Ok(())
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| config_error("expected a duration in milliseconds", key))
}

fn config_error(msg: &'static str, key: &'static str) -> CoreError {
    CoreError::error()
        .domain(Domain::Config)
        .kind(ErrorKind::InvalidArgument)
        .msg(msg)
        .payload(Payload::Context {
            key: "setting",
            value: key.into(),
        })
        .build()
}
