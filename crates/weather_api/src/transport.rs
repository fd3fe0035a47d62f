use agent_contract::{AgentRequest, AgentTransport, ResponseBody, TransportFailure, TransportProfile};
use tracing::{debug, warn};

use crate::client::WeatherApiClient;
use crate::config::WeatherApiConfig;
use crate::error::WeatherApiError;

/// Stable transport identifier used for explicit startup selection.
pub const HTTP_TRANSPORT_ID: &str = "http";

/// `AgentTransport` backed by the blocking-facade HTTP client.
///
/// Each call drives the async client on a private current-thread runtime, so
/// `send` must be called from a plain worker thread, never from inside a Tokio
/// runtime.
#[derive(Debug)]
pub struct HttpTransport {
    client: WeatherApiClient,
}

impl HttpTransport {
    pub fn new(config: WeatherApiConfig) -> Result<Self, WeatherApiError> {
        Ok(Self {
            client: WeatherApiClient::new(config)?,
        })
    }

    pub fn client(&self) -> &WeatherApiClient {
        &self.client
    }

    fn send_blocking(&self, request: &AgentRequest) -> Result<ResponseBody, WeatherApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                WeatherApiError::Runtime(format!("failed to initialize tokio runtime: {error}"))
            })?;

        let payload = self
            .client
            .request_for(&request.thread_id, &request.content);
        runtime.block_on(self.client.send_body(&payload))
    }
}

impl AgentTransport for HttpTransport {
    fn profile(&self) -> TransportProfile {
        TransportProfile {
            transport_id: HTTP_TRANSPORT_ID.to_string(),
            endpoint: self.client.normalized_endpoint(),
        }
    }

    fn send(&self, request: AgentRequest) -> Result<ResponseBody, TransportFailure> {
        debug!(
            request_id = request.request_id,
            thread_id = %request.thread_id,
            "sending agent request"
        );

        self.send_blocking(&request).map_err(|error| {
            let failure = error.to_transport_failure();
            warn!(request_id = request.request_id, %error, "agent request failed");
            failure
        })
    }
}
