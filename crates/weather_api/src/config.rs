use std::collections::BTreeMap;
use std::time::Duration;

use crate::url::{DEFAULT_AGENT_ID, DEFAULT_BASE_URL};

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport configuration for weather agent requests.
#[derive(Debug, Clone)]
pub struct WeatherApiConfig {
    /// Base URL, or the full streaming endpoint.
    pub base_url: String,
    /// Agent path segment in the endpoint.
    pub agent_id: String,
    /// `runId` sent in every payload.
    pub run_id: String,
    /// `resourceId` sent in every payload.
    pub resource_id: String,
    /// Sends the development playground marker header.
    pub playground: bool,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub max_steps: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            run_id: DEFAULT_AGENT_ID.to_string(),
            resource_id: DEFAULT_AGENT_ID.to_string(),
            playground: true,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            max_retries: 2,
            max_steps: 5,
            temperature: 0.5,
            top_p: 1.0,
        }
    }
}

impl WeatherApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the agent id and uses it for `runId` and `resourceId` as well.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        let agent_id = agent_id.into();
        self.run_id = agent_id.clone();
        self.resource_id = agent_id.clone();
        self.agent_id = agent_id;
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_playground(mut self, playground: bool) -> Self {
        self.playground = playground;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}
