use std::sync::Arc;

use agent_contract::AgentTransport;
use mock_transport::{MockTransport, MOCK_TRANSPORT_ID};
use weather_api::{HttpTransport, WeatherApiConfig, HTTP_TRANSPORT_ID};

use crate::config::{api_config_from_env, env_string_opt, TRANSPORT_ENV_VAR};

pub const DEFAULT_TRANSPORT_ID: &str = HTTP_TRANSPORT_ID;

pub fn transport_from_env() -> Result<Arc<dyn AgentTransport>, String> {
    let transport_id = env_string_opt(TRANSPORT_ENV_VAR);
    match transport_id.as_deref().unwrap_or(DEFAULT_TRANSPORT_ID) {
        HTTP_TRANSPORT_ID => http_transport(api_config_from_env()?),
        other => transport_for_id(other),
    }
}

/// Resolves a transport by id, using default HTTP settings.
pub fn transport_for_id(transport_id: &str) -> Result<Arc<dyn AgentTransport>, String> {
    match transport_id {
        HTTP_TRANSPORT_ID => http_transport(WeatherApiConfig::new()),
        MOCK_TRANSPORT_ID => Ok(Arc::new(MockTransport::new())),
        unknown => Err(format!(
            "Unsupported transport '{unknown}'. Available transports: {HTTP_TRANSPORT_ID}, {MOCK_TRANSPORT_ID}"
        )),
    }
}

fn http_transport(config: WeatherApiConfig) -> Result<Arc<dyn AgentTransport>, String> {
    HttpTransport::new(config)
        .map(|transport| Arc::new(transport) as Arc<dyn AgentTransport>)
        .map_err(|error| format!("Failed to initialize HTTP transport: {error}"))
}
