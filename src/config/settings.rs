//! Panel and Telegram settings loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Telegram API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Token issued by `@BotFather`.
    pub bot_token: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("bot.session")
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub fn new(api_id: i32, api_hash: String, bot_token: String) -> Self {
        Self {
            api_id,
            api_hash,
            bot_token,
            session_path: default_session_path(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_API_ID`, `TG_API_HASH` and `TG_BOT_TOKEN` to be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_id: i32 = required_var("TG_API_ID")?
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;

        let api_hash = required_var("TG_API_HASH")?;
        let bot_token = required_var("TG_BOT_TOKEN")?;

        let session_path = std::env::var("TG_SESSION_PATH")
            .map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            bot_token,
            session_path,
        })
    }
}

/// Panel connection and refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Base URL of the panel, without a trailing slash.
    pub address: String,

    pub username: String,

    pub password: String,

    /// Name of the cookie carrying the panel session.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Timeout for the login request in seconds.
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,

    /// Timeout for the inbound list request in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Sleep between refresh cycles, successful or not.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Drop the session when the panel rejects a fetch so the next cycle logs in again.
    #[serde(default = "default_relogin")]
    pub relogin: bool,
}

fn default_session_cookie() -> String {
    "session".to_owned()
}

fn default_login_timeout() -> u64 {
    3
}

fn default_fetch_timeout() -> u64 {
    2
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_relogin() -> bool {
    true
}

impl PanelConfig {
    /// Creates a panel configuration with default timings.
    #[must_use]
    pub fn new(address: &str, username: String, password: String) -> Self {
        Self {
            address: normalize_address(address),
            username,
            password,
            session_cookie: default_session_cookie(),
            login_timeout_secs: default_login_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            relogin: default_relogin(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// `PANEL_ADDRESS`, `PANEL_USERNAME` and `PANEL_PASSWORD` are required,
    /// everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            &required_var("PANEL_ADDRESS")?,
            required_var("PANEL_USERNAME")?,
            required_var("PANEL_PASSWORD")?,
        );

        if let Ok(cookie) = std::env::var("PANEL_SESSION_COOKIE")
            && !cookie.is_empty()
        {
            config.session_cookie = cookie;
        }

        config.login_timeout_secs =
            parsed_var("PANEL_LOGIN_TIMEOUT_SECS")?.unwrap_or(config.login_timeout_secs);
        config.fetch_timeout_secs =
            parsed_var("PANEL_FETCH_TIMEOUT_SECS")?.unwrap_or(config.fetch_timeout_secs);
        config.refresh_interval_secs =
            parsed_var("REFRESH_INTERVAL_SECS")?.unwrap_or(config.refresh_interval_secs);
        config.relogin = parsed_var("PANEL_RELOGIN")?.unwrap_or(config.relogin);

        config.validate()?;
        Ok(config)
    }

    /// Rejects zero timeouts and a zero refresh interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("PANEL_LOGIN_TIMEOUT_SECS", self.login_timeout_secs),
            ("PANEL_FETCH_TIMEOUT_SECS", self.fetch_timeout_secs),
            ("REFRESH_INTERVAL_SECS", self.refresh_interval_secs),
        ];

        for (name, secs) in durations {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: secs.to_string(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub const fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn normalize_address(address: &str) -> String {
    address.trim().trim_end_matches('/').to_owned()
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name)),
    }
}

fn parsed_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}
