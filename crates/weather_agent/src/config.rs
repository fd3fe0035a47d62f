use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_store::data_root;
use serde::Deserialize;
use weather_api::WeatherApiConfig;
use weather_chat::EnvConfig;

pub const TRANSPORT_ENV_VAR: &str = "WEATHER_CHAT_TRANSPORT";
pub const CONFIG_PATH_ENV_VAR: &str = "WEATHER_CHAT_CONFIG_PATH";

/// Contents of the optional HTTP transport config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfigFile {
    pub base_url: Option<String>,
    pub agent_id: Option<String>,
    pub resource_id: Option<String>,
    pub timeout_sec: Option<u64>,
    pub playground: Option<bool>,
}

impl ApiConfigFile {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path).map_err(|error| {
            format!("Failed to read config file '{}': {error}", path.display())
        })?;
        Self::parse(&raw)
            .map_err(|error| format!("Invalid config file '{}': {error}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let parsed: Self = serde_json::from_str(raw).map_err(|error| error.to_string())?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), String> {
        if self.timeout_sec == Some(0) {
            return Err("timeout_sec must be > 0".to_string());
        }

        if let Some(base_url) = &self.base_url {
            let base_url = base_url.trim();
            let host = base_url
                .strip_prefix("https://")
                .or_else(|| base_url.strip_prefix("http://"));
            if host.map_or(true, |host| host.trim_start_matches('/').is_empty()) {
                return Err(format!("base_url must be an http(s) URL, got '{base_url}'"));
            }
        }

        Ok(())
    }

    pub fn into_api_config(self) -> WeatherApiConfig {
        let mut config = WeatherApiConfig::new();
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url.trim());
        }
        if let Some(agent_id) = self.agent_id.filter(|id| !id.trim().is_empty()) {
            config = config.with_agent_id(agent_id.trim());
        }
        if let Some(resource_id) = self.resource_id.filter(|id| !id.trim().is_empty()) {
            config = config.with_resource_id(resource_id.trim());
        }
        if let Some(timeout_sec) = self.timeout_sec {
            config = config.with_timeout(Duration::from_secs(timeout_sec));
        }
        if let Some(playground) = self.playground {
            config = config.with_playground(playground);
        }
        config
    }
}

/// HTTP transport config from `WEATHER_CHAT_CONFIG_PATH`, or defaults when unset.
pub fn api_config_from_env() -> Result<WeatherApiConfig, String> {
    match env_path(CONFIG_PATH_ENV_VAR) {
        Some(path) => Ok(ApiConfigFile::load(&path)?.into_api_config()),
        None => Ok(WeatherApiConfig::new()),
    }
}

/// Directories the front end reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPaths {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl AgentPaths {
    pub fn resolve(env: &EnvConfig, cwd: &Path) -> Self {
        Self {
            data_dir: env.data_dir.clone().unwrap_or_else(|| data_root(cwd)),
            export_dir: env.export_dir.clone().unwrap_or_else(|| cwd.to_path_buf()),
        }
    }
}

pub(crate) fn env_string_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string_opt(key).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use weather_chat::EnvConfig;

    use super::{AgentPaths, ApiConfigFile};

    #[test]
    fn full_file_maps_onto_api_config() {
        let file = ApiConfigFile::parse(
            r#"{
                "base_url": "http://localhost:4111/api",
                "agent_id": "stormAgent",
                "resource_id": "tenant-7",
                "timeout_sec": 12,
                "playground": false
            }"#,
        )
        .expect("config should parse");

        let config = file.into_api_config();
        assert_eq!(config.base_url, "http://localhost:4111/api");
        assert_eq!(config.agent_id, "stormAgent");
        assert_eq!(config.resource_id, "tenant-7");
        assert_eq!(config.timeout, Some(Duration::from_secs(12)));
        assert!(!config.playground);
    }

    #[test]
    fn empty_object_keeps_defaults() {
        let config = ApiConfigFile::parse("{}")
            .expect("empty config should parse")
            .into_api_config();

        assert_eq!(config.base_url, weather_api::DEFAULT_BASE_URL);
        assert_eq!(config.agent_id, weather_api::DEFAULT_AGENT_ID);
        assert_eq!(config.timeout, Some(weather_api::config::DEFAULT_TIMEOUT));
        assert!(config.playground);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = ApiConfigFile::parse(r#"{"model": "gpt"}"#).expect_err("unknown field");
        assert!(error.contains("unknown field `model`"), "{error}");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let error = ApiConfigFile::parse(r#"{"timeout_sec": 0}"#).expect_err("zero timeout");
        assert_eq!(error, "timeout_sec must be > 0");
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        for base_url in ["ftp://example.com", "example.com", "https://"] {
            let raw = format!(r#"{{"base_url": "{base_url}"}}"#);
            let error = ApiConfigFile::parse(&raw).expect_err("bad base url");
            assert!(error.starts_with("base_url must be an http(s) URL"), "{error}");
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = ApiConfigFile::load(Path::new("/nonexistent/weather.json"))
            .expect_err("missing file");
        assert!(error.contains("/nonexistent/weather.json"), "{error}");
    }

    #[test]
    fn paths_default_under_working_directory() {
        let cwd = Path::new("/work");
        assert_eq!(
            AgentPaths::resolve(&EnvConfig::default(), cwd),
            AgentPaths {
                data_dir: PathBuf::from("/work/.weather_chat"),
                export_dir: PathBuf::from("/work"),
            }
        );

        let env = EnvConfig {
            data_dir: Some(PathBuf::from("/data")),
            export_dir: Some(PathBuf::from("/out")),
            ..EnvConfig::default()
        };
        assert_eq!(
            AgentPaths::resolve(&env, cwd),
            AgentPaths {
                data_dir: PathBuf::from("/data"),
                export_dir: PathBuf::from("/out"),
            }
        );
    }
}
