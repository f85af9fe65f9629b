//! Configuration structs

mod app_config;

pub use app_config::{AppConfig, AppSettings, ChatConfig, ConfigError, Environment, LogConfig};
