use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::WeatherApiConfig;

/// One message in the request `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub role: String,
    pub content: String,
}

/// Request payload for the agent streaming endpoint.
///
/// Only the new user message is sent; the agent keeps conversation memory
/// keyed by `threadId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub messages: Vec<StreamMessage>,
    pub run_id: String,
    pub max_retries: u32,
    pub max_steps: u32,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default)]
    pub runtime_context: Map<String, Value>,
    pub thread_id: String,
    pub resource_id: String,
}

impl StreamRequest {
    /// Builds a payload carrying a single user message with sampling defaults from `config`.
    pub fn user_message(
        config: &WeatherApiConfig,
        thread_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            messages: vec![StreamMessage {
                role: "user".to_string(),
                content: content.into(),
            }],
            run_id: config.run_id.clone(),
            max_retries: config.max_retries,
            max_steps: config.max_steps,
            temperature: config.temperature,
            top_p: config.top_p,
            runtime_context: Map::new(),
            thread_id: thread_id.into(),
            resource_id: config.resource_id.clone(),
        }
    }
}
