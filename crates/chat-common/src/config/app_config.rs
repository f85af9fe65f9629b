//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use chat_core::RoomName;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    #[serde(default)]
    pub chat: ChatConfig,
    pub log: LogConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(format!("unknown environment: {s}")),
        }
    }
}

/// Chat engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Messages retained per room (and delivered as backfill)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Idle time after which a typing marker expires
    #[serde(default = "default_typing_ttl_ms")]
    pub typing_ttl_ms: u64,
    /// Longest accepted message text, in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Room joined when none is requested
    #[serde(default)]
    pub default_room: RoomName,
    /// Live events a subscriber may fall behind by before it is dropped
    #[serde(default = "default_sink_buffer")]
    pub sink_buffer: usize,
}

impl ChatConfig {
    /// Typing expiry as a `Duration`
    #[must_use]
    pub fn typing_ttl(&self) -> Duration {
        Duration::from_millis(self.typing_ttl_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            typing_ttl_ms: default_typing_ttl_ms(),
            max_message_length: default_max_message_length(),
            default_room: RoomName::default(),
            sink_buffer: default_sink_buffer(),
        }
    }
}

/// Logging output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_app_name() -> String {
    "chat-sync".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_history_limit() -> usize {
    200
}

fn default_typing_ttl_ms() -> u64 {
    1500
}

fn default_max_message_length() -> usize {
    2000
}

fn default_sink_buffer() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = parse_var(&lookup, "APP_ENV", default_env())?;

        let history_limit = parse_var(&lookup, "CHAT_HISTORY_LIMIT", default_history_limit())?;
        if history_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_HISTORY_LIMIT",
                "must be greater than zero".to_string(),
            ));
        }

        let typing_ttl_ms = parse_var(&lookup, "CHAT_TYPING_TTL_MS", default_typing_ttl_ms())?;
        if typing_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_TYPING_TTL_MS",
                "must be greater than zero".to_string(),
            ));
        }

        let max_message_length = parse_var(
            &lookup,
            "CHAT_MAX_MESSAGE_LENGTH",
            default_max_message_length(),
        )?;
        if max_message_length == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_MAX_MESSAGE_LENGTH",
                "must be greater than zero".to_string(),
            ));
        }

        let sink_buffer = parse_var(&lookup, "CHAT_SINK_BUFFER", default_sink_buffer())?;
        if sink_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_SINK_BUFFER",
                "must be greater than zero".to_string(),
            ));
        }

        let default_room = match lookup("CHAT_DEFAULT_ROOM") {
            Some(raw) => RoomName::new(&raw)
                .map_err(|e| ConfigError::InvalidValue("CHAT_DEFAULT_ROOM", e.to_string()))?,
            None => RoomName::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            chat: ChatConfig {
                history_limit,
                typing_ttl_ms,
                max_message_length,
                default_room,
                sink_buffer,
            },
            log: LogConfig {
                level: lookup("LOG_LEVEL").unwrap_or_else(default_log_level),
                json: parse_var(&lookup, "LOG_JSON", env.is_production())?,
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
