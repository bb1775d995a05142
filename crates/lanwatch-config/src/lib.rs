//! Configuration for the lanwatch daemon.
//!
//! A TOML file (XDG location, overridable) merged with
//! `LANWATCH_`-prefixed environment variables (`__` separates nesting:
//! `LANWATCH_ROUTER__PASSWORD` sets `router.password`). The daemon
//! resolves secrets and URLs through the accessor methods, which carry
//! field-level validation errors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lanwatch_api::TransportConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no router password configured (set LANWATCH_ROUTER__PASSWORD or [router] password)")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Which backend answers the active-hosts question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ZXHN-family web-admin protocol client.
    Zxhn,
    /// External active-hosts feed (JSON array endpoint).
    Feed,
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub throttle: ThrottleSection,

    #[serde(default)]
    pub notify: NotifySection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouterSection {
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// Admin interface base URL (e.g. "http://192.168.1.1").
    #[serde(default = "default_router_url")]
    pub url: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password (prefer the environment variable).
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    /// Host feed endpoint; required for the "feed" backend.
    pub feed_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_router_url(),
            username: default_username(),
            password: None,
            password_env: None,
            feed_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WatchSection {
    /// Seconds between poll cycles.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// MAC addresses that never trigger the limit. Any common format.
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Control-page endpoint for the tracking mode. Omit to track on
    /// every cycle without auto-release.
    pub mode_url: Option<String>,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            whitelist: Vec::new(),
            mode_url: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ThrottleSection {
    pub toggle_url: Option<String>,
    pub state_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotifySection {
    pub webhook_url: Option<String>,

    /// Display name the webhook posts under.
    #[serde(default = "default_notify_username")]
    pub username: String,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: default_notify_username(),
        }
    }
}

fn default_backend() -> Backend {
    Backend::Zxhn
}
fn default_router_url() -> String {
    "http://192.168.1.1".into()
}
fn default_username() -> String {
    "admin".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_interval() -> u64 {
    60
}
fn default_notify_username() -> String {
    "lanwatch".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "lanwatch", "lanwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lanwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration from file + environment.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LANWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Resolution / validation accessors ───────────────────────────────

impl Config {
    pub fn router_url(&self) -> Result<Url, ConfigError> {
        parse_url("router.url", &self.router.url)
    }

    /// The feed endpoint; an error when the feed backend is selected
    /// without one.
    pub fn feed_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .router
            .feed_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "router.feed_url".into(),
                reason: "required for the feed backend".into(),
            })?;
        parse_url("router.feed_url", raw)
    }

    /// Resolve the router password: named environment variable first,
    /// then the config file.
    pub fn resolve_password(&self) -> Result<SecretString, ConfigError> {
        if let Some(ref env_name) = self.router.password_env {
            if let Ok(value) = std::env::var(env_name) {
                return Ok(SecretString::from(value));
            }
        }

        if let Some(ref password) = self.router.password {
            return Ok(SecretString::from(password.clone()));
        }

        Err(ConfigError::NoCredentials)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.router.timeout_secs),
            ..TransportConfig::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.watch.interval_secs)
    }

    pub fn toggle_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .throttle
            .toggle_url
            .as_deref()
            .ok_or_else(|| missing("throttle.toggle_url"))?;
        parse_url("throttle.toggle_url", raw)
    }

    pub fn state_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .throttle
            .state_url
            .as_deref()
            .ok_or_else(|| missing("throttle.state_url"))?;
        parse_url("throttle.state_url", raw)
    }

    pub fn mode_url(&self) -> Result<Option<Url>, ConfigError> {
        self.watch
            .mode_url
            .as_deref()
            .map(|raw| parse_url("watch.mode_url", raw))
            .transpose()
    }

    pub fn webhook_url(&self) -> Result<Option<Url>, ConfigError> {
        self.notify
            .webhook_url
            .as_deref()
            .map(|raw| parse_url("notify.webhook_url", raw))
            .transpose()
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: "not configured".into(),
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}
