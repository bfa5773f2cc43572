//! Wall Configuration
//!
//! Layered configuration for the engine and its backends. Sources, lowest
//! precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. `DRIFTWALL_*` environment variables
//!
//! Surfaces may apply their own overrides (command-line flags) on top.
//!
//! # Example file
//!
//! ```toml
//! [sync]
//! poll_interval_ms = 2500
//!
//! [motion]
//! speed_min = 20.0
//! speed_max = 60.0
//!
//! [backend]
//! host = "wall.local"
//! port = 8080
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::RevealPolicy;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Values are individually valid but inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Poll cadence and badge timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between list-since polls, in milliseconds
    pub poll_interval_ms: u64,
    /// How long a newly arrived card shows its "new" badge, in milliseconds
    pub badge_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2500,
            badge_ms: 4000,
        }
    }
}

impl SyncConfig {
    /// Poll interval as a duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Badge lifetime as a duration
    #[must_use]
    pub fn badge_duration(&self) -> Duration {
        Duration::from_millis(self.badge_ms)
    }
}

/// Card motion parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Lower bound of the launch speed (units/second)
    pub speed_min: f64,
    /// Upper bound of the launch speed (units/second, exclusive)
    pub speed_max: f64,
    /// Cap on the integration step, in milliseconds
    pub max_tick_dt_ms: u64,
    /// Minimum launch span kept free along each axis
    pub launch_margin: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_min: 30.0,
            speed_max: 75.0,
            max_tick_dt_ms: 250,
            launch_margin: 10.0,
        }
    }
}

impl MotionConfig {
    /// Cap on the integration step
    #[must_use]
    pub fn max_tick_dt(&self) -> Duration {
        Duration::from_millis(self.max_tick_dt_ms)
    }
}

/// Where the wall server lives
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Per-request timeout, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            request_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    /// Base URL of the server
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Poll cadence
    pub sync: SyncConfig,
    /// Card motion
    pub motion: MotionConfig,
    /// Remote server
    #[serde(rename = "backend")]
    pub server: ServerConfig,
    /// Reveal policy used by the in-process backend
    pub reveal: RevealPolicy,
}

impl WallConfig {
    /// Defaults overlaid with environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a TOML file, then overlay environment variables
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded wall config");
        Ok(config)
    }

    /// Overlay values from a key lookup
    ///
    /// Recognized keys:
    /// - `DRIFTWALL_POLL_MS`: poll interval in ms
    /// - `DRIFTWALL_BADGE_MS`: "new" badge lifetime in ms
    /// - `DRIFTWALL_SPEED_MIN` / `DRIFTWALL_SPEED_MAX`: launch speed range
    /// - `DRIFTWALL_MAX_DT_MS`: integration step cap in ms
    /// - `DRIFTWALL_HOST` / `DRIFTWALL_PORT`: wall server address
    /// - `DRIFTWALL_TIMEOUT_MS`: request timeout in ms
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parsed(&lookup, "DRIFTWALL_POLL_MS") {
            self.sync.poll_interval_ms = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_BADGE_MS") {
            self.sync.badge_ms = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_SPEED_MIN") {
            self.motion.speed_min = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_SPEED_MAX") {
            self.motion.speed_max = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_MAX_DT_MS") {
            self.motion.max_tick_dt_ms = v;
        }
        if let Some(v) = lookup("DRIFTWALL_HOST") {
            self.server.host = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_PORT") {
            self.server.port = v;
        }
        if let Some(v) = parsed(&lookup, "DRIFTWALL_TIMEOUT_MS") {
            self.server.request_timeout_ms = v;
        }
        self
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.poll_interval_ms must be positive".into(),
            ));
        }
        if !(self.motion.speed_min.is_finite() && self.motion.speed_max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "motion speeds must be finite, got [{}, {})",
                self.motion.speed_min, self.motion.speed_max
            )));
        }
        if !(self.motion.speed_min >= 0.0 && self.motion.speed_min <= self.motion.speed_max) {
            return Err(ConfigError::Invalid(format!(
                "motion speed range [{}, {}) is empty or negative",
                self.motion.speed_min, self.motion.speed_max
            )));
        }
        if !(self.motion.launch_margin.is_finite() && self.motion.launch_margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "motion.launch_margin {} must be finite and non-negative",
                self.motion.launch_margin
            )));
        }
        if self.motion.max_tick_dt_ms == 0 {
            return Err(ConfigError::Invalid(
                "motion.max_tick_dt_ms must be positive".into(),
            ));
        }
        if self.reveal.hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "reveal.hour {} is not an hour of the day",
                self.reveal.hour
            )));
        }
        Ok(())
    }
}
