use std::collections::BTreeMap;

use crate::config::WeatherApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_PLAYGROUND: &str = "x-mastra-dev-playground";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for agent requests.
///
/// Extra headers are lowercased and may override the defaults.
pub fn build_headers(config: &WeatherApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );
    headers.insert(
        HEADER_ACCEPT.to_owned(),
        "text/event-stream, application/json".to_owned(),
    );
    if config.playground {
        headers.insert(HEADER_PLAYGROUND.to_owned(), "true".to_owned());
    }

    let ua = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

fn default_user_agent() -> String {
    format!(
        "weather-chat/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}
