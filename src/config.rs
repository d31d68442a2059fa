//! Client configuration
//!
//! Resolution order, later wins:
//!   1. built-in defaults
//!   2. `config.toml` (explicit path, or `<config dir>/mindful-chat/config.toml`)
//!   3. `MINDFUL_API_URL` / `MINDFUL_TIMEOUT_SECS` environment variables
//!   4. command-line flags, as [`ConfigOverrides`]

use crate::{MindfulError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(60);

pub const ENV_API_URL: &str = "MINDFUL_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MINDFUL_TIMEOUT_SECS";

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the assistant backend
    pub api_url: String,

    /// Per-request timeout enforced by the HTTP gateway
    pub request_timeout: Duration,

    /// How often the liveness poller calls the health endpoint
    pub health_interval: Duration,

    /// Whether to run the liveness poller at all
    pub health_check: bool,
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub health_interval_secs: Option<u64>,
    pub no_health: bool,
}

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigToml {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    health_interval_secs: Option<u64>,
    health_check: Option<bool>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            health_check: true,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    pub fn with_health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// `<config dir>/mindful-chat/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mindful-chat").join("config.toml"))
    }

    /// Load defaults, then the config file, then the process environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(MindfulError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                config.apply_file(path).await?;
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    if default_path.exists() {
                        config.apply_file(&default_path).await?;
                    } else {
                        debug!("No config file at {}", default_path.display());
                    }
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    async fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path).await?;
        let file: ConfigToml = toml::from_str(&content)
            .map_err(|e| MindfulError::Config(format!("{}: {}", path.display(), e)))?;

        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(timeout) = file
            .request_timeout_secs
            .and_then(|secs| nonzero_secs("request_timeout_secs", secs))
        {
            self.request_timeout = timeout;
        }
        if let Some(interval) = file
            .health_interval_secs
            .and_then(|secs| nonzero_secs("health_interval_secs", secs))
        {
            self.health_interval = interval;
        }
        if let Some(enabled) = file.health_check {
            self.health_check = enabled;
        }

        info!("Loaded config from {}", path.display());
        Ok(())
    }

    /// Apply command-line flags, the last and strongest layer.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = overrides.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(timeout) = overrides
            .request_timeout_secs
            .and_then(|secs| nonzero_secs("--timeout", secs))
        {
            self.request_timeout = timeout;
        }
        if let Some(interval) = overrides
            .health_interval_secs
            .and_then(|secs| nonzero_secs("--health-interval", secs))
        {
            self.health_interval = interval;
        }
        if overrides.no_health {
            self.health_check = false;
        }
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT_SECS, raw),
            }
        }
    }
}

/// Zero durations are rejected: a zero timeout fails every request and a zero
/// interval cannot drive a ticker.
fn nonzero_secs(key: &str, secs: u64) -> Option<Duration> {
    if secs == 0 {
        warn!("Ignoring {} = 0; it must be at least one second", key);
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
