//! Environment configuration.

use std::env;
use std::path::PathBuf;

pub const LOG_ENV_VAR: &str = "WEATHER_CHAT_LOG";
pub const DATA_DIR_ENV_VAR: &str = "WEATHER_CHAT_DATA_DIR";
pub const EXPORT_DIR_ENV_VAR: &str = "WEATHER_CHAT_EXPORT_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `tracing` filter directives; `WEATHER_CHAT_LOG`, then `RUST_LOG`.
    pub log_filter: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt(LOG_ENV_VAR).or_else(|| env_string_opt("RUST_LOG")),
            data_dir: env_string_opt(DATA_DIR_ENV_VAR).map(PathBuf::from),
            export_dir: env_string_opt(EXPORT_DIR_ENV_VAR).map(PathBuf::from),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
